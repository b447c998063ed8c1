//! Request enrichment.
//!
//! Each function consumes the transport's [`Inbound`] and the resolved catalog
//! entries and builds a fresh request value. Enrichment cannot fail and happens
//! before any hook sees the request.

use service_broker_core::{
    BindingPath, CreateServiceInstanceBindingBody, CreateServiceInstanceBindingRequest,
    CreateServiceInstanceBody, CreateServiceInstanceRequest, DeleteQuery,
    DeleteServiceInstanceBindingRequest, DeleteServiceInstanceRequest,
    GetLastServiceBindingOperationRequest, GetLastServiceOperationRequest,
    GetServiceInstanceBindingRequest, GetServiceInstanceRequest, Inbound, InstancePath,
    LastOperationQuery, Plan, ServiceDefinition, UpdateServiceInstanceBody,
    UpdateServiceInstanceRequest,
};
use std::sync::Arc;

/// Build a provisioning request.
#[must_use]
pub fn create_instance(
    inbound: Inbound<InstancePath, CreateServiceInstanceBody>,
    service_definition: Arc<ServiceDefinition>,
    plan: Arc<Plan>,
) -> CreateServiceInstanceRequest {
    let Inbound {
        path,
        accepts_incomplete,
        envelope,
        body,
    } = inbound;

    CreateServiceInstanceRequest {
        service_instance_id: path.service_instance_id,
        service_definition_id: body.service_id,
        plan_id: body.plan_id,
        organization_guid: body.organization_guid,
        space_guid: body.space_guid,
        context: body.context,
        parameters: body.parameters,
        service_definition,
        plan,
        async_accepted: accepts_incomplete,
        envelope,
    }
}

/// Build an update request.
#[must_use]
pub fn update_instance(
    inbound: Inbound<InstancePath, UpdateServiceInstanceBody>,
    service_definition: Arc<ServiceDefinition>,
    plan: Option<Arc<Plan>>,
) -> UpdateServiceInstanceRequest {
    let Inbound {
        path,
        accepts_incomplete,
        envelope,
        body,
    } = inbound;

    UpdateServiceInstanceRequest {
        service_instance_id: path.service_instance_id,
        service_definition_id: body.service_id,
        plan_id: body.plan_id,
        previous_values: body.previous_values,
        context: body.context,
        parameters: body.parameters,
        service_definition,
        plan,
        async_accepted: accepts_incomplete,
        envelope,
    }
}

/// Build a deprovisioning request. Ids are kept even when they did not resolve.
#[must_use]
pub fn delete_instance(
    inbound: Inbound<InstancePath, DeleteQuery>,
    service_definition: Arc<ServiceDefinition>,
    plan: Option<Arc<Plan>>,
) -> DeleteServiceInstanceRequest {
    DeleteServiceInstanceRequest {
        service_instance_id: inbound.path.service_instance_id,
        service_definition_id: inbound.body.service_id,
        plan_id: inbound.body.plan_id,
        service_definition,
        plan,
        async_accepted: inbound.accepts_incomplete,
        envelope: inbound.envelope,
    }
}

/// Build an instance fetch request.
#[must_use]
pub fn get_instance(inbound: Inbound<InstancePath, ()>) -> GetServiceInstanceRequest {
    GetServiceInstanceRequest {
        service_instance_id: inbound.path.service_instance_id,
        envelope: inbound.envelope,
    }
}

/// Build an instance `last_operation` poll.
#[must_use]
pub fn last_operation(
    inbound: Inbound<InstancePath, LastOperationQuery>,
    service_definition: Option<Arc<ServiceDefinition>>,
    plan: Option<Arc<Plan>>,
) -> GetLastServiceOperationRequest {
    GetLastServiceOperationRequest {
        service_instance_id: inbound.path.service_instance_id,
        service_definition_id: inbound.body.service_id,
        plan_id: inbound.body.plan_id,
        operation: inbound.body.operation,
        service_definition,
        plan,
        envelope: inbound.envelope,
    }
}

/// Build a binding request.
#[must_use]
pub fn create_binding(
    inbound: Inbound<BindingPath, CreateServiceInstanceBindingBody>,
    service_definition: Arc<ServiceDefinition>,
    plan: Arc<Plan>,
) -> CreateServiceInstanceBindingRequest {
    let Inbound {
        path,
        accepts_incomplete,
        envelope,
        body,
    } = inbound;

    CreateServiceInstanceBindingRequest {
        service_instance_id: path.service_instance_id,
        binding_id: path.binding_id,
        service_definition_id: body.service_id,
        plan_id: body.plan_id,
        app_guid: body.app_guid,
        bind_resource: body.bind_resource,
        context: body.context,
        parameters: body.parameters,
        service_definition,
        plan,
        async_accepted: accepts_incomplete,
        envelope,
    }
}

/// Build an unbinding request. Ids are kept even when they did not resolve.
#[must_use]
pub fn delete_binding(
    inbound: Inbound<BindingPath, DeleteQuery>,
    service_definition: Arc<ServiceDefinition>,
    plan: Option<Arc<Plan>>,
) -> DeleteServiceInstanceBindingRequest {
    DeleteServiceInstanceBindingRequest {
        service_instance_id: inbound.path.service_instance_id,
        binding_id: inbound.path.binding_id,
        service_definition_id: inbound.body.service_id,
        plan_id: inbound.body.plan_id,
        service_definition,
        plan,
        async_accepted: inbound.accepts_incomplete,
        envelope: inbound.envelope,
    }
}

/// Build a binding fetch request.
#[must_use]
pub fn get_binding(inbound: Inbound<BindingPath, ()>) -> GetServiceInstanceBindingRequest {
    GetServiceInstanceBindingRequest {
        service_instance_id: inbound.path.service_instance_id,
        binding_id: inbound.path.binding_id,
        envelope: inbound.envelope,
    }
}

/// Build a binding `last_operation` poll.
#[must_use]
pub fn last_binding_operation(
    inbound: Inbound<BindingPath, LastOperationQuery>,
    service_definition: Option<Arc<ServiceDefinition>>,
    plan: Option<Arc<Plan>>,
) -> GetLastServiceBindingOperationRequest {
    GetLastServiceBindingOperationRequest {
        service_instance_id: inbound.path.service_instance_id,
        binding_id: inbound.path.binding_id,
        service_definition_id: inbound.body.service_id,
        plan_id: inbound.body.plan_id,
        operation: inbound.body.operation,
        service_definition,
        plan,
        envelope: inbound.envelope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use service_broker_core::{OriginatingIdentity, RequestEnvelope};

    #[test]
    fn test_create_instance_preserves_catalog_identity() {
        let definition = Arc::new(ServiceDefinition::new("sd-1", "db", "Database"));
        let plan = Arc::new(Plan::new("plan-1", "small", "Small"));
        let envelope = RequestEnvelope {
            platform_instance_id: Some("platform-a".to_string()),
            api_info_location: Some("api.example.com/v2/info".to_string()),
            originating_identity: Some(OriginatingIdentity {
                platform: "cloudfoundry".to_string(),
                properties: json!({ "user_id": "u-1" }).as_object().cloned().unwrap_or_default(),
            }),
            request_identity: Some("req-42".to_string()),
        };
        let body = CreateServiceInstanceBody {
            service_id: "sd-1".to_string(),
            plan_id: "plan-1".to_string(),
            ..Default::default()
        };
        let inbound = Inbound::new(
            InstancePath {
                service_instance_id: "i-1".to_string(),
            },
            body,
        )
        .accepts_incomplete(true)
        .with_envelope(envelope.clone());

        let request = create_instance(inbound, Arc::clone(&definition), Arc::clone(&plan));

        assert!(Arc::ptr_eq(&request.service_definition, &definition));
        assert!(Arc::ptr_eq(&request.plan, &plan));
        assert_eq!(request.service_instance_id, "i-1");
        assert!(request.async_accepted);
        assert_eq!(request.envelope, envelope);
    }

    #[test]
    fn test_delete_keeps_unresolved_ids() {
        let inbound = Inbound::new(
            InstancePath {
                service_instance_id: "i-1".to_string(),
            },
            DeleteQuery {
                service_id: "sd-gone".to_string(),
                plan_id: "plan-gone".to_string(),
            },
        );

        let request = delete_instance(inbound, Arc::new(ServiceDefinition::placeholder()), None);

        assert_eq!(request.service_definition_id, "sd-gone");
        assert_eq!(request.plan_id, "plan-gone");
        assert!(request.plan.is_none());
        assert!(!request.async_accepted);
    }
}
