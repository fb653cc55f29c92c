use deezer_resolve::{CatalogClient, DeezerGwClient};

/// One-off candidate search against the catalog.
pub async fn handle_search(
    client: DeezerGwClient,
    query: &str,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let candidates = client.search(query, limit).await?;

    if candidates.is_empty() {
        println!("No candidates for '{query}'");
        return Ok(());
    }

    println!("Candidates for '{query}':");
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{:>3}. {}  [track {}]", i + 1, candidate.display(), candidate.id);
    }

    Ok(())
}
