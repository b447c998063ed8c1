//! Request and response types for every broker operation.
//!
//! Requests arrive in two stages. The transport fills an [`Inbound`] with what it
//! parsed from the path, query string, headers and body; the runtime's enricher
//! then resolves catalog entries and builds the immutable request value that hooks
//! and business services see. Nothing mutates a request after that.

pub mod binding;
pub mod envelope;
pub mod instance;
pub mod operation;

pub use binding::{
    BindResource, CreateServiceInstanceBindingBody, CreateServiceInstanceBindingRequest,
    CreateServiceInstanceBindingResponse, DeleteServiceInstanceBindingRequest,
    DeleteServiceInstanceBindingResponse, GetLastServiceBindingOperationRequest,
    GetLastServiceBindingOperationResponse, GetServiceInstanceBindingRequest,
    GetServiceInstanceBindingResponse, VolumeMount,
};
pub use envelope::{
    BindingPath, DeleteQuery, Inbound, InstancePath, LastOperationQuery, OriginatingIdentity,
    RequestEnvelope,
};
pub use instance::{
    CreateServiceInstanceBody, CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceRequest, DeleteServiceInstanceResponse, GetLastServiceOperationRequest,
    GetLastServiceOperationResponse, GetServiceInstanceRequest, GetServiceInstanceResponse,
    PreviousValues, UpdateServiceInstanceBody, UpdateServiceInstanceRequest,
    UpdateServiceInstanceResponse,
};
pub use operation::{OperationKind, OperationState};

use crate::error::ServiceBrokerError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Requests that carry an opaque `parameters` object.
pub trait Parameterized {
    /// Raw parameters as sent by the platform.
    fn parameters(&self) -> &Map<String, Value>;

    /// Deserialize the parameters into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceBrokerError::InvalidParameters`] if the parameters do not
    /// match `T`.
    fn parameters_as<T: DeserializeOwned>(&self) -> Result<T, ServiceBrokerError> {
        serde_json::from_value(Value::Object(self.parameters().clone())).map_err(|e| {
            ServiceBrokerError::InvalidParameters(format!(
                "Error mapping parameters to {}: {e}",
                std::any::type_name::<T>()
            ))
        })
    }
}
