//! Prompt construction: the plan workflow's graph-generation system
//! prompt, and the codegen workflow's per-`nodeType` generator table plus
//! its system/user prompt assembly (spec.md 4.F.2, 4.G.2, 4.G.3.c/d).

use forge_graph::{Node, NodeType};
use std::collections::HashMap;

/// System prompt for [`crate::plan::PlanWorkflow`]'s `generateGraph` step:
/// instructs the model to emit a JSON object `{name, description?,
/// nodes[]}` where each node has `{id?, name, nodeType, spec?}`.
pub fn plan_system_prompt() -> String {
    r#"You are a cloud architecture planning assistant. Given a user's description of a deployment, respond with a single JSON object describing the microservice graph:

{
  "name": "short graph name",
  "description": "optional one-line description",
  "nodes": [
    {"id": "optional stable id", "name": "node name", "nodeType": "MICROSERVICE|DATABASE|CACHE|MESSAGE_QUEUE|PROXY|LOAD_BALANCER|MONITORING|GATEWAY|EXTERNAL_DEPENDENCY", "spec": {}}
  ]
}

Respond with JSON only, no prose and no markdown fences."#
        .to_string()
}

/// A per-`nodeType` prompt fragment generator. Concrete functions are
/// registered in [`generator_table`]; `generic_prompt` is the fallback.
pub type PromptGenerator = fn(&Node) -> String;

fn generic_prompt(node: &Node) -> String {
    format!(
        "Generate a Kubernetes manifest for {} \"{}\" (type {}).",
        node.node_type.as_str().to_lowercase().replace('_', " "),
        node.name,
        node.node_type.as_str()
    )
}

fn microservice_prompt(node: &Node) -> String {
    format!(
        "Generate a Deployment and Service for the microservice \"{}\". Include resource requests/limits and a readiness probe.",
        node.name
    )
}

fn database_prompt(node: &Node) -> String {
    format!(
        "Generate a StatefulSet, headless Service, and PersistentVolumeClaim for the database \"{}\". Include a Secret for credentials.",
        node.name
    )
}

fn cache_prompt(node: &Node) -> String {
    format!(
        "Generate a Deployment and Service for the in-memory cache \"{}\". Do not provision persistent storage unless the spec requests it.",
        node.name
    )
}

fn message_queue_prompt(node: &Node) -> String {
    format!(
        "Generate a StatefulSet and headless Service for the message broker \"{}\", with a PersistentVolumeClaim for its log/queue storage.",
        node.name
    )
}

fn gateway_prompt(node: &Node) -> String {
    format!(
        "Generate an Ingress and Service for the API gateway \"{}\". Terminate TLS at the Ingress.",
        node.name
    )
}

fn monitoring_prompt(node: &Node) -> String {
    format!(
        "Generate a Deployment, Service, and ConfigMap for the monitoring component \"{}\".",
        node.name
    )
}

fn load_balancer_prompt(node: &Node) -> String {
    format!(
        "Generate a Service of type LoadBalancer for \"{}\", routing to the appropriate backend Deployment.",
        node.name
    )
}

fn proxy_prompt(node: &Node) -> String {
    format!(
        "Generate a Deployment and Service for the reverse proxy \"{}\".",
        node.name
    )
}

/// One generator per `nodeType`; nodeTypes without an entry use
/// [`generic_prompt`].
pub fn generator_table() -> HashMap<NodeType, PromptGenerator> {
    let mut table: HashMap<NodeType, PromptGenerator> = HashMap::new();
    table.insert(NodeType::Microservice, microservice_prompt);
    table.insert(NodeType::Database, database_prompt);
    table.insert(NodeType::Cache, cache_prompt);
    table.insert(NodeType::MessageQueue, message_queue_prompt);
    table.insert(NodeType::Gateway, gateway_prompt);
    table.insert(NodeType::Monitoring, monitoring_prompt);
    table.insert(NodeType::LoadBalancer, load_balancer_prompt);
    table.insert(NodeType::Proxy, proxy_prompt);
    table
}

/// Build the per-node prompt for `node`, dispatching through
/// [`generator_table`] with [`generic_prompt`] as the fallback.
pub fn prompt_for_node(node: &Node, table: &HashMap<NodeType, PromptGenerator>) -> String {
    match table.get(&node.node_type) {
        Some(generator) => generator(node),
        None => generic_prompt(node),
    }
}

/// Node-type histogram summary line used both in the RAG context and in
/// the codegen system prompt's graph-level context section.
pub fn node_type_histogram(nodes: &[Node]) -> String {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for node in nodes {
        *counts.entry(node.node_type.as_str()).or_insert(0) += 1;
    }
    let mut entries: Vec<(&'static str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(t, n)| format!("{t}: {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fixed sections shared by every codegen system prompt: best practices,
/// security, and resource limits (spec.md 4.G.3.c).
fn fixed_sections() -> &'static str {
    "## Best practices\n\
Follow Kubernetes best practices: explicit resource requests/limits, \
liveness and readiness probes, non-root containers where feasible.\n\n\
## Security\n\
Never hardcode secrets in manifests; reference Secret objects. Avoid \
privileged containers and hostPath volumes unless explicitly required.\n\n\
## Resource limits\n\
Set conservative default CPU/memory requests and limits unless the \
input graph's node spec overrides them.\n\n"
}

/// Assemble the codegen workflow's system prompt: fixed header, the
/// shared sections above, the RAG summary, categorized user context, and
/// graph-level context, ending with the required output-format
/// specification.
pub fn codegen_system_prompt(
    rag_summary: Option<&str>,
    user_context: &[String],
    graph_nodes: &[Node],
    namespaces: &[String],
) -> String {
    let mut prompt = String::from(
        "You are a Kubernetes manifest generation assistant. Produce production-ready \
         manifests for the requested infrastructure.\n\n",
    );
    prompt.push_str(fixed_sections());

    if let Some(summary) = rag_summary {
        prompt.push_str("## Similar prior deployments\n");
        prompt.push_str(summary);
        prompt.push_str("\n\n");
    }

    if !user_context.is_empty() {
        prompt.push_str("## User-provided context\n");
        for (i, entry) in user_context.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, entry));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Graph context\n");
    prompt.push_str(&format!("Node types: {}\n", node_type_histogram(graph_nodes)));
    if !namespaces.is_empty() {
        prompt.push_str(&format!("Namespaces: {}\n", namespaces.join(", ")));
    }
    prompt.push('\n');

    prompt.push_str(
        "## Output format\n\
         Respond with a single JSON object: {\"manifests\": [{\"file_name\": string, \
         \"generated_code\": string, \"assumptions\": [string], \"decisions\": [string], \
         \"commands\": [string], \"entity_name\": string, \"entity_id\": string, \
         \"entity_type\": string}]}. Respond with JSON only.",
    );

    prompt
}

/// Build the user-turn prompt: the user's requirements concatenated with
/// each per-node target message (spec.md 4.G.3.d).
pub fn codegen_user_prompt(requirements: &str, target_prompts: &[String]) -> String {
    let mut prompt = requirements.trim().to_string();
    if !target_prompts.is_empty() {
        prompt.push_str("\n\nGenerate manifests for the following components:\n");
        for (i, p) in target_prompts.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, p));
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microservice_dispatches_to_specific_generator() {
        let node = Node::new("a", "api", NodeType::Microservice);
        let table = generator_table();
        let prompt = prompt_for_node(&node, &table);
        assert!(prompt.contains("Deployment and Service"));
    }

    #[test]
    fn unregistered_type_falls_back_to_generic() {
        let node = Node::new("a", "a-pod", NodeType::Pod);
        let table = generator_table();
        let prompt = prompt_for_node(&node, &table);
        assert!(prompt.contains("Generate a Kubernetes manifest"));
    }

    #[test]
    fn histogram_counts_by_type() {
        let nodes = vec![
            Node::new("a", "a", NodeType::Microservice),
            Node::new("b", "b", NodeType::Microservice),
            Node::new("c", "c", NodeType::Database),
        ];
        let summary = node_type_histogram(&nodes);
        assert!(summary.contains("MICROSERVICE: 2"));
        assert!(summary.contains("DATABASE: 1"));
    }
}
