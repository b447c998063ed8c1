//! Transport-supplied request data: the common envelope and the inbound container.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of the platform user that initiated the request.
///
/// Decoded from the `X-Broker-API-Originating-Identity` header; the core never
/// interprets the properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginatingIdentity {
    /// Platform name, e.g. `cloudfoundry` or `kubernetes`
    pub platform: String,
    /// Platform-specific identity properties
    pub properties: Map<String, Value>,
}

/// Fields common to every broker request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestEnvelope {
    /// Platform instance id from the optional path prefix
    pub platform_instance_id: Option<String>,
    /// `X-Api-Info-Location` header
    pub api_info_location: Option<String>,
    /// Decoded `X-Broker-API-Originating-Identity` header
    pub originating_identity: Option<OriginatingIdentity>,
    /// `X-Broker-API-Request-Identity` header
    pub request_identity: Option<String>,
}

/// Path of a service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePath {
    /// `:instance_id`
    pub service_instance_id: String,
}

/// Path of a service binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPath {
    /// `:instance_id`
    pub service_instance_id: String,
    /// `:binding_id`
    pub binding_id: String,
}

/// Everything the transport parsed for one request, before enrichment.
#[derive(Debug, Clone)]
pub struct Inbound<P, B> {
    /// Path identifiers
    pub path: P,
    /// `accepts_incomplete` query flag
    pub accepts_incomplete: bool,
    /// Header-derived envelope
    pub envelope: RequestEnvelope,
    /// Body or query payload
    pub body: B,
}

impl<P, B> Inbound<P, B> {
    /// Create an inbound request with an empty envelope.
    #[must_use]
    pub fn new(path: P, body: B) -> Self {
        Self {
            path,
            accepts_incomplete: false,
            envelope: RequestEnvelope::default(),
            body,
        }
    }

    /// Set the `accepts_incomplete` flag.
    #[must_use]
    pub fn accepts_incomplete(mut self, accepts_incomplete: bool) -> Self {
        self.accepts_incomplete = accepts_incomplete;
        self
    }

    /// Set the envelope.
    #[must_use]
    pub fn with_envelope(mut self, envelope: RequestEnvelope) -> Self {
        self.envelope = envelope;
        self
    }
}

impl Inbound<InstancePath, ()> {
    /// Inbound request for a bodiless instance operation.
    #[must_use]
    pub fn instance(service_instance_id: impl Into<String>) -> Self {
        Self::new(
            InstancePath {
                service_instance_id: service_instance_id.into(),
            },
            (),
        )
    }
}

/// Query parameters of a delete request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteQuery {
    /// `service_id`
    pub service_id: String,
    /// `plan_id`
    pub plan_id: String,
}

/// Query parameters of a `last_operation` poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LastOperationQuery {
    /// `service_id`
    pub service_id: Option<String>,
    /// `plan_id`
    pub plan_id: Option<String>,
    /// `operation` as previously returned by the broker
    pub operation: Option<String>,
}
