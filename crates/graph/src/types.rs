//! The data model (spec.md §3): [`Graph`], [`Node`], [`Edge`],
//! [`ConnectionRule`], plus the closed `nodeType`/`connectionType`
//! enumerations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphType {
    Microservice,
    Kubernetes,
    Infrastructure,
    Abstract,
    Debugging,
}

impl GraphType {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphType::Microservice => "MICROSERVICE",
            GraphType::Kubernetes => "KUBERNETES",
            GraphType::Infrastructure => "INFRASTRUCTURE",
            GraphType::Abstract => "ABSTRACT",
            GraphType::Debugging => "DEBUGGING",
        }
    }
}

/// Closed enumeration of node kinds: Kubernetes primitives, higher-level
/// infrastructure concepts, and externally-owned dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Pod,
    Service,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    CronJob,
    ConfigMap,
    Secret,
    Ingress,
    PersistentVolumeClaim,
    Namespace,
    ServiceAccount,
    NetworkPolicy,
    HorizontalPodAutoscaler,
    Microservice,
    Database,
    Cache,
    MessageQueue,
    Proxy,
    LoadBalancer,
    Monitoring,
    Gateway,
    ExternalDependency,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Pod => "POD",
            NodeType::Service => "SERVICE",
            NodeType::Deployment => "DEPLOYMENT",
            NodeType::StatefulSet => "STATEFUL_SET",
            NodeType::DaemonSet => "DAEMON_SET",
            NodeType::ReplicaSet => "REPLICA_SET",
            NodeType::Job => "JOB",
            NodeType::CronJob => "CRON_JOB",
            NodeType::ConfigMap => "CONFIG_MAP",
            NodeType::Secret => "SECRET",
            NodeType::Ingress => "INGRESS",
            NodeType::PersistentVolumeClaim => "PERSISTENT_VOLUME_CLAIM",
            NodeType::Namespace => "NAMESPACE",
            NodeType::ServiceAccount => "SERVICE_ACCOUNT",
            NodeType::NetworkPolicy => "NETWORK_POLICY",
            NodeType::HorizontalPodAutoscaler => "HORIZONTAL_POD_AUTOSCALER",
            NodeType::Microservice => "MICROSERVICE",
            NodeType::Database => "DATABASE",
            NodeType::Cache => "CACHE",
            NodeType::MessageQueue => "MESSAGE_QUEUE",
            NodeType::Proxy => "PROXY",
            NodeType::LoadBalancer => "LOAD_BALANCER",
            NodeType::Monitoring => "MONITORING",
            NodeType::Gateway => "GATEWAY",
            NodeType::ExternalDependency => "EXTERNAL_DEPENDENCY",
        }
    }

    pub fn is_external(self) -> bool {
        matches!(self, NodeType::ExternalDependency)
    }
}

/// Closed enumeration of edge kinds. Representative of the production
/// rule table's full ~60-variant catalogue rather than an exhaustive
/// port; new relationships are added here as the rule table grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    Manages,
    ServiceExposesPod,
    DeploymentManagesPod,
    StatefulsetManagesPod,
    DaemonsetManagesPod,
    IngressRoutesToService,
    ServiceRoutesToDeployment,
    CronjobCreatesJob,
    JobCreatesPod,
    ConfigmapMountedBy,
    SecretMountedBy,
    ServiceaccountUsedBy,
    PvcBoundToPod,
    NamespaceContains,
    DeploymentUsesConfigmap,
    DeploymentUsesSecret,
    DeploymentUsesServiceaccount,
    DeploymentMountsPvc,
    MicroserviceExposesService,
    MicroserviceDependsOn,
    MicroserviceCallsMicroservice,
    DatabaseUsedBy,
    CacheUsedBy,
    MessagequeueProducedBy,
    MessagequeueConsumedBy,
    ProxyRoutesTo,
    LoadbalancerRoutesTo,
    GatewayRoutesTo,
    GatewayExposesService,
    ProxyExposesService,
    LoadbalancerExposesService,
    MonitoringScrapes,
    MonitoringAlertsOn,
    ExternalDependencyCalledBy,
    IngressTerminatesTlsFor,
    HpaScalesDeployment,
    NetworkpolicyAppliesTo,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Manages => "MANAGES",
            ConnectionType::ServiceExposesPod => "SERVICE_EXPOSES_POD",
            ConnectionType::DeploymentManagesPod => "DEPLOYMENT_MANAGES_POD",
            ConnectionType::StatefulsetManagesPod => "STATEFULSET_MANAGES_POD",
            ConnectionType::DaemonsetManagesPod => "DAEMONSET_MANAGES_POD",
            ConnectionType::IngressRoutesToService => "INGRESS_ROUTES_TO_SERVICE",
            ConnectionType::ServiceRoutesToDeployment => "SERVICE_ROUTES_TO_DEPLOYMENT",
            ConnectionType::CronjobCreatesJob => "CRONJOB_CREATES_JOB",
            ConnectionType::JobCreatesPod => "JOB_CREATES_POD",
            ConnectionType::ConfigmapMountedBy => "CONFIGMAP_MOUNTED_BY",
            ConnectionType::SecretMountedBy => "SECRET_MOUNTED_BY",
            ConnectionType::ServiceaccountUsedBy => "SERVICEACCOUNT_USED_BY",
            ConnectionType::PvcBoundToPod => "PVC_BOUND_TO_POD",
            ConnectionType::NamespaceContains => "NAMESPACE_CONTAINS",
            ConnectionType::DeploymentUsesConfigmap => "DEPLOYMENT_USES_CONFIGMAP",
            ConnectionType::DeploymentUsesSecret => "DEPLOYMENT_USES_SECRET",
            ConnectionType::DeploymentUsesServiceaccount => "DEPLOYMENT_USES_SERVICEACCOUNT",
            ConnectionType::DeploymentMountsPvc => "DEPLOYMENT_MOUNTS_PVC",
            ConnectionType::MicroserviceExposesService => "MICROSERVICE_EXPOSES_SERVICE",
            ConnectionType::MicroserviceDependsOn => "MICROSERVICE_DEPENDS_ON",
            ConnectionType::MicroserviceCallsMicroservice => "MICROSERVICE_CALLS_MICROSERVICE",
            ConnectionType::DatabaseUsedBy => "DATABASE_USED_BY",
            ConnectionType::CacheUsedBy => "CACHE_USED_BY",
            ConnectionType::MessagequeueProducedBy => "MESSAGEQUEUE_PRODUCED_BY",
            ConnectionType::MessagequeueConsumedBy => "MESSAGEQUEUE_CONSUMED_BY",
            ConnectionType::ProxyRoutesTo => "PROXY_ROUTES_TO",
            ConnectionType::LoadbalancerRoutesTo => "LOADBALANCER_ROUTES_TO",
            ConnectionType::GatewayRoutesTo => "GATEWAY_ROUTES_TO",
            ConnectionType::GatewayExposesService => "GATEWAY_EXPOSES_SERVICE",
            ConnectionType::ProxyExposesService => "PROXY_EXPOSES_SERVICE",
            ConnectionType::LoadbalancerExposesService => "LOADBALANCER_EXPOSES_SERVICE",
            ConnectionType::MonitoringScrapes => "MONITORING_SCRAPES",
            ConnectionType::MonitoringAlertsOn => "MONITORING_ALERTS_ON",
            ConnectionType::ExternalDependencyCalledBy => "EXTERNAL_DEPENDENCY_CALLED_BY",
            ConnectionType::IngressTerminatesTlsFor => "INGRESS_TERMINATES_TLS_FOR",
            ConnectionType::HpaScalesDeployment => "HPA_SCALES_DEPLOYMENT",
            ConnectionType::NetworkpolicyAppliesTo => "NETWORKPOLICY_APPLIES_TO",
        }
    }
}

/// `(connectionType, targetNode)`. Edges live on their source node
/// (`Node::edges`) and hold the target's id rather than a pointer, since
/// Node/Edge otherwise forms a cyclic object graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub connection_type: ConnectionType,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "Value::default")]
    pub spec: Value,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            namespace: None,
            spec: Value::Object(Default::default()),
            edges: Vec::new(),
            payload: None,
        }
    }

    /// True if this node already has an outgoing edge of `connection_type`
    /// to `target`, used to keep rule-based edge inference idempotent.
    pub fn has_edge(&self, connection_type: ConnectionType, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.connection_type == connection_type && e.target == target)
    }
}

/// A graph bridges to another graph by declaring which of that graph's
/// node ids are visible as valid edge targets here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bridge {
    pub graph_id: String,
    #[serde(default)]
    pub node_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub graph_type: GraphType,
    pub company_id: String,
    pub user_id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub bridges: Vec<Bridge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn resolves(&self, target: &str) -> bool {
        self.nodes.iter().any(|n| n.id == target)
            || self.bridges.iter().any(|b| b.node_ids.iter().any(|id| id == target))
    }

    pub fn edge_target_resolves(&self, target: &str) -> bool {
        self.resolves(target)
    }
}

/// `(sourceType, targetType, connectionType, bidirectional)`. A small
/// fixed table used to infer edges between freshly generated nodes.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionRule {
    pub source_type: NodeType,
    pub target_type: NodeType,
    pub connection_type: ConnectionType,
    pub bidirectional: bool,
}
