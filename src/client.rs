//! Remote probe transport
//!
//! A probe is one timed HTTP request/response cycle against the speed-test
//! endpoint. Every probe opens its own connection so that DNS, TCP and TLS
//! phases are observed instead of hidden behind a pooled connection.
//!
//! The probe timeout bounds each stage separately: resolving, connecting,
//! the TLS handshake, the wait for the response head and the gap between
//! two body frames. A slow transfer that keeps delivering frames never
//! times out. The wait for the response head of an upload also covers
//! sending the body, so it is extended by the time the payload needs at
//! [`MIN_UPLOAD_BYTES_PER_SEC`].

pub mod phases;
pub mod server_timing;

pub use phases::{Phase, PhaseRecorder, PhaseTimestamps};
pub use server_timing::{parse_server_timing, SERVER_TIMING_HEADER};

use crate::{
    defaults::MIN_UPLOAD_BYTES_PER_SEC,
    error::{AppError, ErrorContext, Result},
    models::Config,
    types::Direction,
};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{
    header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, USER_AGENT},
    Method, Request,
};
use hyper_util::rt::TokioIo;
use std::{
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpStream, time::timeout};
use tokio_rustls::{
    rustls::{self, pki_types::ServerName},
    TlsConnector,
};
use tracing::debug;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf, TokioAsyncResolver,
};
use url::{Host, Url};

/// Path serving the server location directory
pub const LOCATIONS_PATH: &str = "/locations";
/// Path serving the `key=value` trace document
pub const TRACE_PATH: &str = "/cdn-cgi/trace";

const DEFAULT_USER_AGENT: &str = concat!("performance-tester/", env!("CARGO_PKG_VERSION"));

/// One probe to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRequest {
    pub direction: Direction,
    /// Payload size in bytes
    pub bytes: u64,
}

impl ProbeRequest {
    /// `GET /__down?bytes=N`
    pub fn download(bytes: u64) -> Self {
        Self { direction: Direction::Download, bytes }
    }

    /// `POST /__up` with an `N` byte body
    pub fn upload(bytes: u64) -> Self {
        Self { direction: Direction::Upload, bytes }
    }

    pub fn method(&self) -> Method {
        match self.direction {
            Direction::Download => Method::GET,
            Direction::Upload => Method::POST,
        }
    }

    pub fn path_and_query(&self) -> String {
        match self.direction {
            Direction::Download => format!("/__down?bytes={}", self.bytes),
            Direction::Upload => "/__up".to_string(),
        }
    }

    /// Request body; uploads carry `bytes` ASCII zeros
    pub fn body(&self) -> Result<Bytes> {
        match self.direction {
            Direction::Download => Ok(Bytes::new()),
            Direction::Upload => {
                let len = usize::try_from(self.bytes).map_err(|_| {
                    AppError::validation(format!("Upload payload of {} bytes does not fit in memory", self.bytes))
                })?;
                Ok(Bytes::from(vec![b'0'; len]))
            }
        }
    }

    /// How long to wait for the response head when every stage may stall
    /// for `idle`
    pub fn response_budget(&self, idle: Duration) -> Duration {
        match self.direction {
            Direction::Download => idle,
            Direction::Upload => idle + Duration::from_secs_f64(self.bytes as f64 / MIN_UPLOAD_BYTES_PER_SEC as f64),
        }
    }

    fn to_http_request(self, authority: &str) -> Result<Request<Full<Bytes>>> {
        let body = self.body()?;
        let mut builder = Request::builder()
            .method(self.method())
            .uri(self.path_and_query())
            .header(HOST, authority)
            .header(USER_AGENT, DEFAULT_USER_AGENT);

        if self.direction == Direction::Upload {
            builder = builder
                .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
                .header(CONTENT_LENGTH, body.len());
        }

        builder
            .body(Full::new(body))
            .map_err(|e| AppError::internal(format!("Failed to build probe request: {}", e)))
    }
}

/// Transport seam between the sampler and the network
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Execute one probe and return its phase timestamps
    async fn probe(&self, request: ProbeRequest) -> Result<PhaseTimestamps>;

    /// Fetch a plaintext/JSON document from the endpoint
    async fn fetch_text(&self, path: &str) -> Result<String>;

    async fn download(&self, bytes: u64) -> Result<PhaseTimestamps> {
        self.probe(ProbeRequest::download(bytes)).await
    }

    async fn upload(&self, bytes: u64) -> Result<PhaseTimestamps> {
        self.probe(ProbeRequest::upload(bytes)).await
    }
}

/// Resolved form of the endpoint host
#[derive(Debug, Clone)]
enum Target {
    Ip(IpAddr),
    Domain(String),
}

/// Speed-test endpoint reached over HTTP/1.1, with TLS for `https`
pub struct HttpProbeTransport {
    endpoint: Url,
    target: Target,
    server_name: String,
    authority: String,
    port: u16,
    tls: Option<TlsConnector>,
    resolver: TokioAsyncResolver,
    http: reqwest::Client,
    probe_timeout: Duration,
}

impl HttpProbeTransport {
    /// Create a transport for `endpoint`
    pub fn new(endpoint: Url, request_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        let (target, server_name) = match endpoint.host() {
            Some(Host::Domain(domain)) => (Target::Domain(domain.to_string()), domain.to_string()),
            Some(Host::Ipv4(ip)) => (Target::Ip(IpAddr::V4(ip)), ip.to_string()),
            Some(Host::Ipv6(ip)) => (Target::Ip(IpAddr::V6(ip)), ip.to_string()),
            None => return Err(AppError::validation(format!("Endpoint '{}' has no host", endpoint))),
        };

        let tls = match endpoint.scheme() {
            "https" => Some(tls_connector()?),
            "http" => None,
            scheme => {
                return Err(AppError::validation(format!("Unsupported endpoint scheme: {}", scheme)));
            }
        };

        let port = endpoint
            .port_or_known_default()
            .ok_or_else(|| AppError::validation(format!("Endpoint '{}' has no port", endpoint)))?;

        // Url::port() is only set for non-default ports, which is exactly when
        // the Host header must carry it
        let host_str = endpoint.host_str().unwrap_or(&server_name).to_string();
        let authority = match endpoint.port() {
            Some(port) => format!("{}:{}", host_str, port),
            None => host_str,
        };

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            target,
            server_name,
            authority,
            port,
            tls,
            resolver: system_resolver(),
            http,
            probe_timeout,
        })
    }

    /// Create a transport from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        Self::new(endpoint, config.request_timeout(), config.probe_timeout())
    }

    async fn resolve(&self, phases: &mut PhaseRecorder) -> Result<SocketAddr> {
        match &self.target {
            Target::Ip(ip) => Ok(SocketAddr::new(*ip, self.port)),
            Target::Domain(domain) => {
                let lookup = self
                    .resolver
                    .lookup_ip(domain.as_str())
                    .await
                    .with_context(|| format!("DNS lookup failed for {}", domain))?;
                let ip = lookup
                    .iter()
                    .next()
                    .ok_or_else(|| AppError::dns_resolution(format!("No IP addresses resolved for {}", domain)))?;
                phases.mark(Phase::DnsResolved)?;
                Ok(SocketAddr::new(ip, self.port))
            }
        }
    }

    async fn run_probe(&self, request: ProbeRequest) -> Result<PhaseTimestamps> {
        let http_request = request.to_http_request(&self.authority)?;
        let idle = self.probe_timeout;
        let mut phases = PhaseRecorder::start();

        let addr = within(idle, request, "resolving the endpoint", self.resolve(&mut phases)).await?;
        let stream = within(idle, request, "connecting", async {
            TcpStream::connect(addr)
                .await
                .map_err(|e| socket_error("TCP connect to", addr, e))
        })
        .await?;
        stream
            .set_nodelay(true)
            .map_err(|e| socket_error("Disabling Nagle on", addr, e))?;
        phases.mark(Phase::TcpConnected)?;

        match &self.tls {
            Some(connector) => {
                let name = ServerName::try_from(self.server_name.clone())
                    .map_err(|e| AppError::validation(format!("Invalid TLS server name {}: {}", self.server_name, e)))?;
                let tls_stream = within(idle, request, "negotiating TLS", async {
                    connector
                        .connect(name, stream)
                        .await
                        .map_err(|e| AppError::network(format!("TLS handshake with {} failed: {}", self.server_name, e)))
                })
                .await?;
                phases.mark(Phase::TlsConnected)?;
                exchange(TokioIo::new(tls_stream), http_request, request, idle, &mut phases).await?;
            }
            None => exchange(TokioIo::new(stream), http_request, request, idle, &mut phases).await?,
        }

        let timestamps = phases.finish()?;
        debug!(
            direction = %request.direction,
            bytes = request.bytes,
            dns_ms = ?timestamps.dns_ms(),
            tcp_ms = ?timestamps.tcp_ms(),
            tls_ms = ?timestamps.tls_ms(),
            ttfb_ms = timestamps.time_to_first_byte_ms(),
            transfer_ms = timestamps.transfer_ms(),
            total_ms = timestamps.total_ms(),
            server_timing_ms = timestamps.server_timing_ms,
            "probe completed"
        );
        Ok(timestamps)
    }
}

/// Send the request over a fresh HTTP/1.1 connection and drain the response
async fn exchange<T>(
    io: T,
    http_request: Request<Full<Bytes>>,
    request: ProbeRequest,
    idle: Duration,
    phases: &mut PhaseRecorder,
) -> Result<()>
where
    T: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let target = http_request.uri().to_string();
    let (mut sender, connection) = hyper::client::conn::http1::handshake(io).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "probe connection closed with error");
        }
    });

    let response = within(request.response_budget(idle), request, "waiting for the response", async {
        sender.send_request(http_request).await.map_err(AppError::from)
    })
    .await?;
    phases.mark(Phase::FirstByte)?;

    let server_timing = response
        .headers()
        .get(SERVER_TIMING_HEADER)
        .and_then(|value| value.to_str().ok());
    phases.set_server_timing_ms(parse_server_timing(server_timing));

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::http_request(format!("{} answered with status {}", target, status)));
    }

    let mut body = response.into_body();
    loop {
        let frame = within(idle, request, "reading the body", async {
            body.frame().await.transpose().map_err(AppError::from)
        })
        .await?;
        if frame.is_none() {
            break;
        }
    }
    phases.mark(Phase::Ended)?;

    Ok(())
}

/// Run one probe stage, failing with a timeout once it makes no progress
/// for `limit`
async fn within<T, F>(limit: Duration, request: ProbeRequest, stage: &str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    timeout(limit, operation).await.map_err(|_| {
        AppError::timeout(format!(
            "{} {} timed out after {:?} while {}",
            request.method(),
            request.path_and_query(),
            limit,
            stage
        ))
    })?
}

fn socket_error(action: &str, addr: SocketAddr, error: io::Error) -> AppError {
    AppError::network(format!("{} {} failed: {}", action, addr, error))
}

fn tls_connector() -> Result<TlsConnector> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| AppError::internal(format!("Failed to configure TLS: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

fn system_resolver() -> TokioAsyncResolver {
    match system_conf::read_system_conf() {
        Ok((config, opts)) => TokioAsyncResolver::tokio(config, opts),
        Err(e) => {
            debug!(error = %e, "system DNS configuration unavailable, using public resolvers");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

#[async_trait]
impl ProbeTransport for HttpProbeTransport {
    async fn probe(&self, request: ProbeRequest) -> Result<PhaseTimestamps> {
        self.run_probe(request).await
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.endpoint.join(path)?;
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
