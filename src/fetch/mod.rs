//! Query ClinVar annotations from [MyVariant.info](https://myvariant.info).

use crate::variant::decode::{Hit, QueryResponse};
use crate::variant::VariantTable;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info, warn};

/// Base URL of the MyVariant.info v1 API.
pub const DEFAULT_URL: &str = "https://myvariant.info/v1";
/// Default maximum number of variants per query.
pub const DEFAULT_SIZE: usize = 400;
/// Largest page size the service accepts.
pub const MAX_SIZE: usize = 1000;

// ----------------------------------------------------------------------------
// Variant Source

/// A service that answers variant queries for a gene symbol.
#[async_trait]
pub trait VariantSource {
    /// Query up to `size` variant records annotated with `gene`.
    async fn query(&self, gene: &str, size: usize) -> Result<QueryResponse, Report>;
}

/// Fetch the ClinVar [`VariantTable`] of a gene.
///
/// Returns `Ok(None)` when the service has no matching records.
///
/// ## Arguments
///
/// - `source` - Where to send the query.
/// - `gene` - Gene symbol, surrounding whitespace is ignored.
/// - `size` - Maximum number of records, clamped to [`MAX_SIZE`].
pub async fn fetch<S>(source: &S, gene: &str, size: usize) -> Result<Option<VariantTable>, Report>
where
    S: VariantSource + ?Sized,
{
    let gene = gene.trim();
    if gene.is_empty() {
        return Err(eyre!("Gene symbol is empty."));
    }

    let size = if size > MAX_SIZE {
        warn!("Requested size {size} exceeds the service limit, using {MAX_SIZE}.");
        MAX_SIZE
    } else {
        size
    };

    info!("Retrieving up to {size} variants for gene: {}", gene.to_uppercase());
    let response = source.query(gene, size).await?;

    let hits = match response.hits {
        Some(hits) if !hits.is_empty() => hits,
        _ => return Ok(None),
    };

    if let Some(total) = response.total {
        if total > hits.len() as u64 {
            debug!("Service reported {total} matches, keeping the first {}.", hits.len());
        }
    }

    let hits = hits.into_iter().map(Hit::from_value).collect_vec();
    let table = VariantTable::from_hits(gene, &hits);
    info!("Loaded {} variants.", table.len());

    Ok(Some(table))
}

// ----------------------------------------------------------------------------
// MyVariant

/// HTTP client for the MyVariant.info query endpoint.
#[derive(Clone, Debug)]
pub struct MyVariant {
    client: reqwest::Client,
    url: String,
}

impl MyVariant {
    /// Create a client for the service at `url`.
    pub fn new(url: &str) -> Result<Self, Report> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .wrap_err("Failed to build HTTP client.")?;
        Ok(MyVariant::with_client(client, url))
    }

    /// Use an existing HTTP `client` for the service at `url`.
    pub fn with_client(client: reqwest::Client, url: &str) -> Self {
        MyVariant { client, url: url.trim_end_matches('/').to_string() }
    }

    /// Build the query request, restricted to the `clinvar` fields.
    ///
    /// ```rust
    /// use clinvar_study::fetch::{MyVariant, DEFAULT_URL};
    /// let request = MyVariant::new(DEFAULT_URL)?.request("CFTR", 400)?;
    /// assert_eq!(request.url().path(), "/v1/query");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn request(&self, gene: &str, size: usize) -> Result<reqwest::Request, Report> {
        let url = format!("{}/query", self.url);
        let query = [
            ("q", format!("clinvar.gene.symbol:{gene}")),
            ("fields", "clinvar".to_string()),
            ("size", size.to_string()),
        ];
        let request = self
            .client
            .get(&url)
            .query(&query)
            .build()
            .wrap_err_with(|| format!("Failed to build query: {url}"))
            .suggestion("Check the --url option.")?;
        Ok(request)
    }
}

#[async_trait]
impl VariantSource for MyVariant {
    async fn query(&self, gene: &str, size: usize) -> Result<QueryResponse, Report> {
        let request = self.request(gene, size)?;
        let url = request.url().to_string();
        debug!("Querying: {url}");

        let response = self
            .client
            .execute(request)
            .await
            .wrap_err_with(|| format!("Failed to query: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Query failed with status {status}: {url}")
                .suggestion(format!("Response: {}", body.trim())));
        }

        let response = response
            .json::<QueryResponse>()
            .await
            .wrap_err_with(|| format!("Failed to parse response: {url}"))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Session};
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_test::block_on;

    /// Answers every query with the same response, recording the requested sizes.
    struct Canned {
        response: Result<QueryResponse, String>,
        sizes: Mutex<Vec<usize>>,
    }

    impl Canned {
        fn new(body: serde_json::Value) -> Self {
            let response = serde_json::from_value(body).map_err(|e| e.to_string());
            Canned { response, sizes: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl VariantSource for Canned {
        async fn query(&self, _gene: &str, size: usize) -> Result<QueryResponse, Report> {
            self.sizes.lock().map_err(|e| eyre!("{e}"))?.push(size);
            self.response.clone().map_err(|e| eyre!(e))
        }
    }

    #[test]
    fn request_parameters() -> Result<(), Report> {
        let request = MyVariant::new("https://example.org/v1/")?.request("BRCA1", 25)?;
        let pairs = request.url().query_pairs().into_owned().collect_vec();
        assert_eq!(
            pairs,
            [
                ("q".to_string(), "clinvar.gene.symbol:BRCA1".to_string()),
                ("fields".to_string(), "clinvar".to_string()),
                ("size".to_string(), "25".to_string()),
            ]
        );
        assert_eq!(request.url().host_str(), Some("example.org"));
        Ok(())
    }

    #[test]
    fn no_hits_is_none() -> Result<(), Report> {
        for body in [json!({"total": 0, "hits": []}), json!({"total": 0})] {
            let source = Canned::new(body);
            assert!(block_on(fetch(&source, "NOTAGENE", DEFAULT_SIZE))?.is_none());
        }
        Ok(())
    }

    #[test]
    fn hits_become_rows() -> Result<(), Report> {
        let source = Canned::new(json!({
            "total": 3,
            "hits": [
                {"_id": "chr7:g.117559590A>G", "clinvar": {"chrom": "7", "hg19": {"start": 117199644}, "rcv": {"clinical_significance": "Pathogenic"}}},
                {"_id": "chr7:g.117530975G>A", "clinvar": {"chrom": "7", "rcv": [{"clinical_significance": "Benign"}]}},
            ]
        }));
        let table = block_on(fetch(&source, " cftr ", DEFAULT_SIZE))?.ok_or(eyre!("no table"))?;
        assert_eq!(table.gene, "CFTR");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].significance, "Benign");
        Ok(())
    }

    #[test]
    fn size_is_clamped() -> Result<(), Report> {
        let source = Canned::new(json!({"hits": []}));
        block_on(fetch(&source, "TP53", 5000))?;
        block_on(fetch(&source, "TP53", 10))?;
        let sizes = source.sizes.lock().map_err(|e| eyre!("{e}"))?.clone();
        assert_eq!(sizes, [MAX_SIZE, 10]);
        Ok(())
    }

    #[test]
    fn empty_gene_is_error() {
        let source = Canned::new(json!({"hits": []}));
        assert!(block_on(fetch(&source, "   ", DEFAULT_SIZE)).is_err());
    }

    #[test]
    fn source_error_propagates() {
        let source = Canned { response: Err("connection refused".into()), sizes: Mutex::new(Vec::new()) };
        assert!(block_on(fetch(&source, "TP53", DEFAULT_SIZE)).is_err());
    }

    /// Answer a single HTTP request on a local port, returning the base url.
    async fn serve_once(status: &str, body: &str) -> Result<String, Report> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        Ok(format!("http://{addr}/v1"))
    }

    fn local(url: &str) -> Result<MyVariant, Report> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(MyVariant::with_client(client, url))
    }

    #[test]
    fn error_status_is_reported() -> Result<(), Report> {
        block_on(async {
            let url = serve_once("500 Internal Server Error", "boom").await?;
            let result = local(&url)?.query("TP53", 10).await;
            let report = result.err().ok_or(eyre!("expected an error"))?;
            assert!(report.to_string().contains("500"));
            Ok::<(), Report>(())
        })
    }

    #[test]
    fn malformed_body_is_error() -> Result<(), Report> {
        block_on(async {
            let url = serve_once("200 OK", "not json").await?;
            let result = local(&url)?.query("TP53", 10).await;
            let report = result.err().ok_or(eyre!("expected an error"))?;
            assert!(report.to_string().contains("Failed to parse response"));
            Ok::<(), Report>(())
        })
    }

    #[test]
    fn failed_query_leaves_no_table() -> Result<(), Report> {
        block_on(async {
            let url = serve_once("503 Service Unavailable", "").await?;
            let mut session = Session::new(local(&url)?, Cli::default());
            assert!(session.fetch("TP53").await.is_none());
            assert!(session.table().is_none());
            Ok::<(), Report>(())
        })
    }
}
