use n8n_http::{N8nClient, WorkflowListParams};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = N8nClient::from_env()?;

    let page = client
        .list_workflows(&WorkflowListParams {
            active: Some(true),
            limit: Some(20),
            ..WorkflowListParams::default()
        })
        .await?;

    for workflow in &page.data {
        println!("{} {}", workflow["id"], workflow["name"]);
    }

    if let Some(first) = page.data.first().and_then(|workflow| workflow["id"].as_str()) {
        match client.get_workflow(first).await {
            Ok(workflow) => println!("{}", serde_json::to_string_pretty(&workflow)?),
            Err(err) => eprintln!("{}", err.to_json()),
        }
    }

    Ok(())
}
