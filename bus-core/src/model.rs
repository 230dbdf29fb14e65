//! Configuration entities and enums

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Message direction relative to the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Inbound to the bus
    In,
    /// Outbound to an external system
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "In"),
            Direction::Out => write!(f, "Out"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "In" => Ok(Direction::In),
            "Out" => Ok(Direction::Out),
            other => Err(Error::InvalidValue {
                what: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Wire format of a payload on a given route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// JSON (the bus-internal canonical format)
    #[serde(rename = "JSON")]
    Json,
    /// XML
    #[serde(rename = "XML")]
    Xml,
    /// dBase table
    #[serde(rename = "DBF")]
    Dbf,
    /// Comma-separated values
    #[serde(rename = "CSV")]
    Csv,
    /// Plain text
    #[serde(rename = "TXT")]
    Txt,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Json => write!(f, "JSON"),
            FileFormat::Xml => write!(f, "XML"),
            FileFormat::Dbf => write!(f, "DBF"),
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Txt => write!(f, "TXT"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "JSON" => Ok(FileFormat::Json),
            "XML" => Ok(FileFormat::Xml),
            "DBF" => Ok(FileFormat::Dbf),
            "CSV" => Ok(FileFormat::Csv),
            "TXT" => Ok(FileFormat::Txt),
            other => Err(Error::InvalidValue {
                what: "file format",
                value: other.to_string(),
            }),
        }
    }
}

/// Wire protocol declared on a thread group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// HTTP REST
    #[serde(rename = "REST")]
    Rest,
    /// SOAP over HTTP POST
    #[serde(rename = "SOAP")]
    Soap,
    /// AMQP message queue
    #[serde(rename = "AMQP")]
    Amqp,
    /// Raw TCP (declared but not dispatchable)
    #[serde(rename = "TCP")]
    Tcp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Rest => write!(f, "REST"),
            Protocol::Soap => write!(f, "SOAP"),
            Protocol::Amqp => write!(f, "AMQP"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "REST" => Ok(Protocol::Rest),
            "SOAP" => Ok(Protocol::Soap),
            "AMQP" => Ok(Protocol::Amqp),
            "TCP" => Ok(Protocol::Tcp),
            other => Err(Error::InvalidValue {
                what: "protocol",
                value: other.to_string(),
            }),
        }
    }
}

/// Message broker flavor for queue-backed thread groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrokerType {
    /// Kafka
    Kafka,
    /// RabbitMQ
    Rabbit,
}

impl std::fmt::Display for BrokerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerType::Kafka => write!(f, "Kafka"),
            BrokerType::Rabbit => write!(f, "Rabbit"),
        }
    }
}

impl FromStr for BrokerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Kafka" => Ok(BrokerType::Kafka),
            "Rabbit" => Ok(BrokerType::Rabbit),
            other => Err(Error::InvalidValue {
                what: "broker type",
                value: other.to_string(),
            }),
        }
    }
}

/// Credential kind for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthKind {
    /// HTTP Basic
    Basic,
    /// Bearer token
    BearerToken,
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthKind::Basic => write!(f, "Basic"),
            AuthKind::BearerToken => write!(f, "BearerToken"),
        }
    }
}

impl FromStr for AuthKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Basic" => Ok(AuthKind::Basic),
            "BearerToken" => Ok(AuthKind::BearerToken),
            other => Err(Error::InvalidValue {
                what: "auth kind",
                value: other.to_string(),
            }),
        }
    }
}

/// HTTP method configured on a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl RestMethod {
    /// Uppercase verb as it goes on the wire
    pub fn http_verb(&self) -> &'static str {
        match self {
            RestMethod::Get => "GET",
            RestMethod::Post => "POST",
            RestMethod::Patch => "PATCH",
            RestMethod::Put => "PUT",
            RestMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestMethod::Get => write!(f, "Get"),
            RestMethod::Post => write!(f, "Post"),
            RestMethod::Patch => write!(f, "Patch"),
            RestMethod::Put => write!(f, "Put"),
            RestMethod::Delete => write!(f, "Delete"),
        }
    }
}

impl FromStr for RestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Get" => Ok(RestMethod::Get),
            "Post" => Ok(RestMethod::Post),
            "Patch" => Ok(RestMethod::Patch),
            "Put" => Ok(RestMethod::Put),
            "Delete" => Ok(RestMethod::Delete),
            other => Err(Error::InvalidValue {
                what: "rest method",
                value: other.to_string(),
            }),
        }
    }
}

/// How a thread fans a message out to its routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConvertType {
    /// One message to every route
    Multiplex,
    /// Message split across routes
    Split,
    /// No conversion behavior
    None,
}

impl std::fmt::Display for ConvertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertType::Multiplex => write!(f, "Multiplex"),
            ConvertType::Split => write!(f, "Split"),
            ConvertType::None => write!(f, "None"),
        }
    }
}

impl FromStr for ConvertType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Multiplex" => Ok(ConvertType::Multiplex),
            "Split" => Ok(ConvertType::Split),
            "None" => Ok(ConvertType::None),
            other => Err(Error::InvalidValue {
                what: "convert type",
                value: other.to_string(),
            }),
        }
    }
}

/// External counterparty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct System {
    /// System ID
    pub id: Uuid,
    /// Human-readable name (orchestrator flows look systems up by it)
    pub name: String,
}

impl System {
    /// Create a system with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Reachable endpoint on a system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route ID
    pub id: Uuid,
    /// Route name
    pub name: String,
    /// Endpoint path (relative, or absolute URL)
    pub path: String,
    /// Owning system
    pub system_id: Uuid,
    /// HTTP method (REST) / ignored for other protocols
    pub method: RestMethod,
}

impl Route {
    /// Create a route with a fresh ID
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        method: RestMethod,
        system_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            path: path.into(),
            system_id,
            method,
        }
    }
}

/// Per-system network configuration (at most one active per system)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSetting {
    /// Setting ID
    pub id: Uuid,
    /// Setting name
    pub name: String,
    /// Owning system
    pub system_id: Uuid,
    /// Base path (scheme + host, optionally a path prefix)
    pub base_path: String,
    /// TCP port; 0 means unset, 80/443 are treated as defaults
    pub port: u16,
    /// Optional credential reference
    pub auth_id: Option<Uuid>,
}

impl ConnectionSetting {
    /// Create a connection setting with a fresh ID
    pub fn new(
        name: impl Into<String>,
        system_id: Uuid,
        base_path: impl Into<String>,
        port: u16,
        auth_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            system_id,
            base_path: base_path.into(),
            port,
            auth_id,
        }
    }
}

/// Credential material for a system connection
///
/// Only the fields required by `kind` are read; the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionAuthentication {
    /// Credential ID
    pub id: Uuid,
    /// Credential name
    pub name: String,
    /// Owning system
    pub system_id: Uuid,
    /// Credential kind
    pub kind: AuthKind,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Bearer token
    pub token: Option<String>,
}

impl ConnectionAuthentication {
    /// Basic credentials
    pub fn basic(
        name: impl Into<String>,
        system_id: Uuid,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            system_id,
            kind: AuthKind::Basic,
            username: Some(username.into()),
            password: Some(password.into()),
            token: None,
        }
    }

    /// Bearer-token credentials
    pub fn bearer(name: impl Into<String>, system_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            system_id,
            kind: AuthKind::BearerToken,
            username: None,
            password: None,
            token: Some(token.into()),
        }
    }
}

/// Protocol declaration shared by a set of threads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadGroup {
    /// Group ID
    pub id: Uuid,
    /// Group name
    pub name: String,
    /// Wire protocol for every thread in the group
    pub protocol: Protocol,
    /// Optional parent group
    pub parent_id: Option<Uuid>,
    /// Broker flavor for queue-backed groups
    pub broker_type: BrokerType,
}

impl ThreadGroup {
    /// Create a group with a fresh ID
    pub fn new(name: impl Into<String>, protocol: Protocol, broker_type: BrokerType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            protocol,
            parent_id: None,
            broker_type,
        }
    }
}

/// Logical message channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Thread ID
    pub id: Uuid,
    /// Thread name
    pub name: String,
    /// Owning group (invariant: resolvable)
    pub group_id: Uuid,
    /// Fan-out behavior
    pub convert_type: ConvertType,
}

impl Thread {
    /// Create a thread with a fresh ID
    pub fn new(name: impl Into<String>, group_id: Uuid, convert_type: ConvertType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group_id,
            convert_type,
        }
    }
}

/// Binding of a thread + direction to a route with an expected wire format
///
/// Unique on (thread_id, direction, route_id); creation is a no-op on
/// conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRoute {
    /// Thread
    pub thread_id: Uuid,
    /// Direction the binding applies to
    pub direction: Direction,
    /// Target route
    pub route_id: Uuid,
    /// Wire format the target expects
    pub file_format: FileFormat,
    /// Message object reference
    pub object_id: Uuid,
    /// Pre/post routine reference
    pub routine_id: Uuid,
}
