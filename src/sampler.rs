//! Latency and throughput sampling against the remote endpoint
//!
//! The sampler drives a [`ProbeTransport`] and turns each probe's phase
//! timestamps into one numeric sample. Probes inside a sampling loop are
//! strictly sequential so they never compete for the same link; only
//! independent work (the initial three-way fetch, the Jobs of one direction)
//! runs concurrently.

use crate::{
    client::{PhaseTimestamps, ProbeTransport},
    defaults::{LATENCY_PROBE_BYTES, LATENCY_PROBE_COUNT, THROUGHPUT_PERCENTILE},
    error::Result,
    location::{fetch_colo, fetch_locations, resolve_location},
    models::{InternetSpeedResult, Job, LatencyStats, ThroughputMbps},
    stats,
    types::Direction,
};
use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info};

/// Round-trip processing time of one latency probe in milliseconds
///
/// Time to first byte minus what the server reports it spent on the request.
/// A non-finite difference becomes 0; a negative one is kept.
pub fn latency_sample(phases: &PhaseTimestamps) -> f64 {
    let millis = phases.time_to_first_byte_ms() - phases.server_timing_ms;
    if millis.is_finite() {
        millis
    } else {
        0.0
    }
}

/// Transfer time of a throughput probe in milliseconds
///
/// Downloads are timed from the response head to the end of the body.
/// Uploads use the server-reported duration, falling back to the client's
/// time to first byte when the server reports nothing.
pub fn transfer_time_ms(direction: Direction, phases: &PhaseTimestamps) -> f64 {
    match direction {
        Direction::Download => phases.transfer_ms(),
        Direction::Upload if phases.server_timing_ms > 0.0 => phases.server_timing_ms,
        Direction::Upload => phases.time_to_first_byte_ms(),
    }
}

/// Throughput sample of one probe in Mbps
pub fn throughput_sample(direction: Direction, bytes: u64, phases: &PhaseTimestamps) -> f64 {
    stats::mbps_from_bytes_and_millis(bytes, transfer_time_ms(direction, phases))
}

/// Drives probes over a transport and collects raw samples
pub struct Sampler<T> {
    transport: T,
}

impl<T: ProbeTransport> Sampler<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exactly [`LATENCY_PROBE_COUNT`] sequential minimal downloads
    pub async fn sample_latency(&self) -> Result<Vec<f64>> {
        let mut samples = Vec::with_capacity(LATENCY_PROBE_COUNT);
        for _ in 0..LATENCY_PROBE_COUNT {
            let phases = self.transport.download(LATENCY_PROBE_BYTES).await?;
            samples.push(latency_sample(&phases));
        }
        debug!(samples = ?samples, "latency samples collected");
        Ok(samples)
    }

    /// Latency samples reduced to min/max/average/median/jitter
    pub async fn measure_latency(&self) -> Result<LatencyStats> {
        let samples = self.sample_latency().await?;
        let latency = LatencyStats::from_samples(&samples)?;
        info!(
            average_ms = latency.average,
            median_ms = latency.median,
            jitter_ms = latency.jitter,
            "latency measured"
        );
        Ok(latency)
    }

    /// `job.iteration` sequential probes of `job.bytes`, one sample each
    pub async fn sample_job(&self, direction: Direction, job: Job) -> Result<Vec<f64>> {
        let mut samples = Vec::with_capacity(job.iteration as usize);
        for _ in 0..job.iteration {
            let phases = match direction {
                Direction::Download => self.transport.download(job.bytes).await?,
                Direction::Upload => self.transport.upload(job.bytes).await?,
            };
            samples.push(throughput_sample(direction, job.bytes, &phases));
        }
        debug!(%direction, job = %job, samples = ?samples, "job sampled");
        Ok(samples)
    }

    /// All Jobs of one direction, flattened in Job order
    ///
    /// The Jobs run concurrently; the first failing probe fails the whole
    /// sequence.
    pub async fn sample_throughput(&self, direction: Direction, jobs: &[Job]) -> Result<Vec<f64>> {
        let per_job = try_join_all(jobs.iter().map(|job| self.sample_job(direction, *job))).await?;
        Ok(per_job.into_iter().flatten().collect())
    }

    /// Full internet test: latency, server location, upload then download
    pub async fn run(&self, upload_jobs: &[Job], download_jobs: &[Job]) -> Result<InternetSpeedResult> {
        let (latency, directory, colo) = tokio::try_join!(
            self.measure_latency(),
            fetch_locations(&self.transport),
            fetch_colo(&self.transport),
        )?;
        let server_location = resolve_location(&directory, &colo)?;
        info!(%colo, city = %server_location.city, "server location resolved");

        let upload_samples = self.sample_throughput(Direction::Upload, upload_jobs).await?;
        let upload = stats::percentile(&upload_samples, THROUGHPUT_PERCENTILE)?;
        info!(upload_mbps = upload, samples = upload_samples.len(), "upload measured");

        let download_samples = self.sample_throughput(Direction::Download, download_jobs).await?;
        let download = stats::percentile(&download_samples, THROUGHPUT_PERCENTILE)?;
        info!(download_mbps = download, samples = download_samples.len(), "download measured");

        Ok(InternetSpeedResult {
            latency,
            colo,
            server_location,
            throughput: ThroughputMbps { upload, download },
            upload_samples: upload_samples.len(),
            download_samples: download_samples.len(),
            completed_at: Utc::now(),
        })
    }
}

/// Run the internet speed test over `transport`
pub async fn run_internet_test<T: ProbeTransport>(
    transport: T,
    upload_jobs: &[Job],
    download_jobs: &[Job],
) -> Result<InternetSpeedResult> {
    Sampler::new(transport).run(upload_jobs, download_jobs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{ProbeRequest, LOCATIONS_PATH, TRACE_PATH},
        defaults::UPLOAD_JOBS,
        error::AppError,
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };
    use std::time::{Duration, Instant};

    const LOCATIONS: &str = r#"[{"iata":"AMS","lat":52.31,"lon":4.76,"cca2":"NL","region":"Europe","city":"Amsterdam"}]"#;

    fn phases(first_byte_ms: u64, ended_ms: u64, server_timing_ms: f64) -> PhaseTimestamps {
        let started = Instant::now();
        PhaseTimestamps {
            started,
            dns_resolved: None,
            tcp_connected: Some(started),
            tls_connected: None,
            first_byte: started + Duration::from_millis(first_byte_ms),
            ended: started + Duration::from_millis(ended_ms),
            server_timing_ms,
        }
    }

    /// In-memory transport answering every probe with the same timings
    struct ScriptedTransport {
        first_byte_ms: u64,
        ended_ms: u64,
        server_timing_ms: f64,
        trace: &'static str,
        fail_after: Option<usize>,
        probes: AtomicUsize,
        requests: Mutex<Vec<ProbeRequest>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                first_byte_ms: 30,
                ended_ms: 130,
                server_timing_ms: 10.0,
                trace: "fl=1\ncolo=AMS\n",
                fail_after: None,
                probes: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_after(probes: usize) -> Self {
            Self {
                fail_after: Some(probes),
                ..Self::new()
            }
        }

        fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }

        fn requests(&self) -> Vec<ProbeRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProbeTransport for ScriptedTransport {
        async fn probe(&self, request: ProbeRequest) -> Result<PhaseTimestamps> {
            let count = self.probes.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| count >= limit) {
                return Err(AppError::network("connection refused"));
            }
            self.requests.lock().unwrap().push(request);
            Ok(phases(self.first_byte_ms, self.ended_ms, self.server_timing_ms))
        }

        async fn fetch_text(&self, path: &str) -> Result<String> {
            match path {
                LOCATIONS_PATH => Ok(LOCATIONS.to_string()),
                TRACE_PATH => Ok(self.trace.to_string()),
                other => Err(AppError::http_request(format!("{} answered with status 404", other))),
            }
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_latency_sample_subtracts_server_time() {
        assert!(approx_eq(latency_sample(&phases(30, 130, 10.0)), 20.0));
        assert!(approx_eq(latency_sample(&phases(30, 130, 0.0)), 30.0));
    }

    #[test]
    fn test_latency_sample_clamps_only_non_finite() {
        assert_eq!(latency_sample(&phases(5, 10, f64::NAN)), 0.0);
        assert_eq!(latency_sample(&phases(5, 10, f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_latency_sample_keeps_negative_difference() {
        // server reports more time than the client saw
        assert!(approx_eq(latency_sample(&phases(5, 10, 50.0)), -45.0));
    }

    #[test]
    fn test_transfer_time_per_direction() {
        let timings = phases(30, 130, 40.0);
        assert!(approx_eq(transfer_time_ms(Direction::Download, &timings), 100.0));
        assert!(approx_eq(transfer_time_ms(Direction::Upload, &timings), 40.0));

        let unreported = phases(30, 130, 0.0);
        assert!(approx_eq(transfer_time_ms(Direction::Upload, &unreported), 30.0));
    }

    #[test]
    fn test_throughput_sample() {
        // 1 MB over 100 ms
        let sample = throughput_sample(Direction::Download, 1_000_000, &phases(30, 130, 0.0));
        assert!(approx_eq(sample, 80.0));
    }

    #[tokio::test]
    async fn test_latency_always_twenty_samples() {
        let sampler = Sampler::new(ScriptedTransport::new());
        let samples = sampler.sample_latency().await.unwrap();

        assert_eq!(samples.len(), 20);
        assert!(samples.iter().all(|s| approx_eq(*s, 20.0)));
        assert!(sampler
            .transport()
            .requests()
            .iter()
            .all(|r| *r == ProbeRequest::download(1000)));
    }

    #[tokio::test]
    async fn test_measure_latency_reduces_samples() {
        let sampler = Sampler::new(ScriptedTransport::new());
        let latency = sampler.measure_latency().await.unwrap();

        assert!(approx_eq(latency.average, 20.0));
        assert!(approx_eq(latency.median, 20.0));
        assert!(approx_eq(latency.jitter, 0.0));
    }

    #[tokio::test]
    async fn test_upload_jobs_produce_ten_samples() {
        let sampler = Sampler::new(ScriptedTransport::new());
        let samples = sampler.sample_throughput(Direction::Upload, UPLOAD_JOBS).await.unwrap();

        assert_eq!(samples.len(), 4 + 3 + 2 + 1);
        assert_eq!(sampler.transport().probe_count(), 10);

        // flattened in job order
        assert!(approx_eq(samples[0], stats::mbps_from_bytes_and_millis(100_000, 10.0)));
        assert!(approx_eq(samples[9], stats::mbps_from_bytes_and_millis(200_000_000, 10.0)));
        let uploads = sampler.transport().requests();
        assert!(uploads.iter().all(|r| r.direction == Direction::Upload));
    }

    #[tokio::test]
    async fn test_failed_probe_fails_throughput() {
        let sampler = Sampler::new(ScriptedTransport::failing_after(3));
        let result = sampler.sample_throughput(Direction::Download, UPLOAD_JOBS).await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn test_failed_latency_probe_fails_latency() {
        let sampler = Sampler::new(ScriptedTransport::failing_after(19));
        assert!(sampler.sample_latency().await.is_err());
    }

    #[tokio::test]
    async fn test_run_internet_test() {
        let jobs = [Job::new(1_000_000, 2), Job::new(2_000_000, 1)];
        let result = run_internet_test(ScriptedTransport::new(), &jobs, &jobs).await.unwrap();

        assert_eq!(result.colo, "AMS");
        assert_eq!(result.server_location.city, "Amsterdam");
        assert_eq!(result.server_location.region, "Europe");
        assert_eq!(result.upload_samples, 3);
        assert_eq!(result.download_samples, 3);
        assert!(approx_eq(result.latency.average, 20.0));
        // download: 100 ms transfer; p90 of [80, 80, 160]
        assert!(approx_eq(result.throughput.download, 144.0));
        // upload: 10 ms server timing; p90 of [800, 800, 1600]
        assert!(approx_eq(result.throughput.upload, 1440.0));
    }

    #[tokio::test]
    async fn test_unknown_colo_aborts_test() {
        let transport = ScriptedTransport {
            trace: "colo=XXX\n",
            ..ScriptedTransport::new()
        };
        let result = run_internet_test(transport, UPLOAD_JOBS, UPLOAD_JOBS).await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_test_without_result() {
        let result = run_internet_test(ScriptedTransport::failing_after(25), UPLOAD_JOBS, UPLOAD_JOBS).await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }
}
