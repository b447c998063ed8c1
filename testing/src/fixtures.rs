//! Catalog and inbound-request fixtures.

use service_broker_core::{
    BindingPath, Catalog, CreateServiceInstanceBindingBody, CreateServiceInstanceBody,
    DeleteQuery, InMemoryCatalog, Inbound, InstancePath, LastOperationQuery, Plan,
    ServiceDefinition, UpdateServiceInstanceBody,
};
use std::sync::Arc;

/// Service definition id present in [`catalog`].
pub const SERVICE_ID: &str = "sd-1";
/// First plan of [`SERVICE_ID`].
pub const PLAN_ID: &str = "plan-1";
/// Second plan of [`SERVICE_ID`].
pub const OTHER_PLAN_ID: &str = "plan-2";
/// Instance id used by the inbound helpers.
pub const INSTANCE_ID: &str = "instance-1";
/// Binding id used by the inbound helpers.
pub const BINDING_ID: &str = "binding-1";

/// A one-service catalog: bindable `sd-1` with plans `plan-1` and `plan-2`.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::new(vec![
        ServiceDefinition::new(SERVICE_ID, "test-db", "A test database")
            .with_bindable(true)
            .with_plan(Plan::new(PLAN_ID, "small", "Small plan"))
            .with_plan(Plan::new(OTHER_PLAN_ID, "large", "Large plan").with_free(false)),
    ])
}

/// [`catalog`] behind an in-memory catalog service.
#[must_use]
pub fn in_memory_catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::new(catalog()))
}

fn instance_path() -> InstancePath {
    InstancePath {
        service_instance_id: INSTANCE_ID.to_string(),
    }
}

fn binding_path() -> BindingPath {
    BindingPath {
        service_instance_id: INSTANCE_ID.to_string(),
        binding_id: BINDING_ID.to_string(),
    }
}

/// Provisioning request for the given ids.
#[must_use]
pub fn create_instance(service_id: &str, plan_id: &str) -> Inbound<InstancePath, CreateServiceInstanceBody> {
    Inbound::new(
        instance_path(),
        CreateServiceInstanceBody {
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
            ..CreateServiceInstanceBody::default()
        },
    )
}

/// Update request for the given ids.
#[must_use]
pub fn update_instance(
    service_id: &str,
    plan_id: Option<&str>,
) -> Inbound<InstancePath, UpdateServiceInstanceBody> {
    Inbound::new(
        instance_path(),
        UpdateServiceInstanceBody {
            service_id: service_id.to_string(),
            plan_id: plan_id.map(str::to_string),
            ..UpdateServiceInstanceBody::default()
        },
    )
}

/// Deprovisioning request for the given ids.
#[must_use]
pub fn delete_instance(service_id: &str, plan_id: &str) -> Inbound<InstancePath, DeleteQuery> {
    Inbound::new(
        instance_path(),
        DeleteQuery {
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
        },
    )
}

/// Instance fetch request.
#[must_use]
pub fn get_instance() -> Inbound<InstancePath, ()> {
    Inbound::instance(INSTANCE_ID)
}

/// Instance poll without optional query parameters.
#[must_use]
pub fn last_operation() -> Inbound<InstancePath, LastOperationQuery> {
    Inbound::new(instance_path(), LastOperationQuery::default())
}

/// Binding request for the given ids.
#[must_use]
pub fn create_binding(
    service_id: &str,
    plan_id: &str,
) -> Inbound<BindingPath, CreateServiceInstanceBindingBody> {
    Inbound::new(
        binding_path(),
        CreateServiceInstanceBindingBody {
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
            ..CreateServiceInstanceBindingBody::default()
        },
    )
}

/// Unbinding request for the given ids.
#[must_use]
pub fn delete_binding(service_id: &str, plan_id: &str) -> Inbound<BindingPath, DeleteQuery> {
    Inbound::new(
        binding_path(),
        DeleteQuery {
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
        },
    )
}

/// Binding fetch request.
#[must_use]
pub fn get_binding() -> Inbound<BindingPath, ()> {
    Inbound::new(binding_path(), ())
}

/// Binding poll without optional query parameters.
#[must_use]
pub fn last_binding_operation() -> Inbound<BindingPath, LastOperationQuery> {
    Inbound::new(binding_path(), LastOperationQuery::default())
}
