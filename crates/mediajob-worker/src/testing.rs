//! In-process fakes of the blob store and the transcoding backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use mediajob_models::{BackendJobState, JobName, ObjectRef};
use mediajob_storage::{BlobReader, BlobStore, ObjectInfo, StorageError, StorageResult};
use mediajob_transcode::{
    AssetRef, BackendAsset, BackendJob, JobErrorDetail, JobHandle, JobOutput, JobOutputError,
    TranscodeBackend, TranscodeError, TranscodeResult,
};

/// Call counter keyed by operation name.
#[derive(Default)]
pub struct Calls(Mutex<HashMap<&'static str, usize>>);

impl Calls {
    fn hit(&self, op: &'static str) {
        *self.0.lock().unwrap().entry(op).or_default() += 1;
    }

    pub fn count(&self, op: &str) -> usize {
        self.0.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.lock().unwrap().values().sum()
    }
}

// =============================================================================
// Blob store
// =============================================================================

#[derive(Default)]
pub struct FakeBlobStore {
    objects: Mutex<HashMap<ObjectRef, Vec<u8>>>,
    dispositions: Mutex<HashMap<ObjectRef, String>>,
    pub calls: Calls,
    /// Make `copy` report an incomplete copy
    pub copy_incomplete: AtomicBool,
    /// Make `copy` fail outright
    pub copy_fails: AtomicBool,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, object: &ObjectRef, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(object.clone(), data.to_vec());
    }

    pub fn get(&self, object: &ObjectRef) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(object).cloned()
    }

    pub fn disposition(&self, object: &ObjectRef) -> Option<String> {
        self.dispositions.lock().unwrap().get(object).cloned()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool> {
        self.calls.hit("exists");
        Ok(self.objects.lock().unwrap().contains_key(object))
    }

    async fn size(&self, object: &ObjectRef) -> StorageResult<u64> {
        self.calls.hit("size");
        self.objects
            .lock()
            .unwrap()
            .get(object)
            .map(|data| data.len() as u64)
            .ok_or_else(|| StorageError::not_found(object.to_string()))
    }

    async fn upload_stream(
        &self,
        object: &ObjectRef,
        mut reader: BlobReader,
        _content_type: &str,
    ) -> StorageResult<u64> {
        self.calls.hit("upload_stream");
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let len = data.len() as u64;
        self.objects.lock().unwrap().insert(object.clone(), data);
        Ok(len)
    }

    async fn upload_text(&self, object: &ObjectRef, text: &str) -> StorageResult<()> {
        self.calls.hit("upload_text");
        self.put(object, text.as_bytes());
        Ok(())
    }

    async fn copy(&self, source: &ObjectRef, dest: &ObjectRef) -> StorageResult<bool> {
        self.calls.hit("copy");
        if self.copy_fails.load(Ordering::SeqCst) {
            return Err(StorageError::copy_failed("injected failure"));
        }
        let data = self
            .get(source)
            .ok_or_else(|| StorageError::not_found(source.to_string()))?;
        if self.copy_incomplete.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.put(dest, &data);
        Ok(true)
    }

    async fn read_url(&self, object: &ObjectRef, _allowed_ip: &str) -> StorageResult<String> {
        self.calls.hit("read_url");
        Ok(format!("https://blob.test/{}?sig=read", object))
    }

    async fn write_url(&self, object: &ObjectRef) -> StorageResult<String> {
        self.calls.hit("write_url");
        Ok(format!("https://blob.test/{}?sig=write", object))
    }

    async fn set_content_disposition(&self, object: &ObjectRef, value: &str) -> StorageResult<()> {
        self.calls.hit("set_content_disposition");
        if !self.objects.lock().unwrap().contains_key(object) {
            return Err(StorageError::not_found(object.to_string()));
        }
        self.dispositions
            .lock()
            .unwrap()
            .insert(object.clone(), value.to_string());
        Ok(())
    }

    async fn list(&self, container: &str, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        self.calls.hit("list");
        let mut objects: Vec<ObjectInfo> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| o.container == container && o.name.starts_with(prefix))
            .map(|(o, data)| ObjectInfo {
                object: o.clone(),
                size: data.len() as u64,
                last_modified: None,
            })
            .collect();
        objects.sort_by(|a, b| a.object.name.cmp(&b.object.name));
        Ok(objects)
    }
}

// =============================================================================
// Transcode backend
// =============================================================================

#[derive(Default)]
pub struct FakeBackend {
    jobs: Mutex<HashMap<String, BackendJob>>,
    assets: Mutex<HashMap<String, BackendAsset>>,
    scripts: Mutex<HashMap<String, VecDeque<BackendJob>>>,
    pub calls: Calls,
    /// Reject job creation with a 400
    pub reject_jobs: AtomicBool,
    /// Number of upcoming deletes that fail with a 503
    pub failing_deletes: AtomicUsize,
    /// Delay applied to `create_job`
    pub create_job_delay: Mutex<Option<Duration>>,
    /// Record the job before the `create_job` delay instead of after it
    pub job_lands_before_delay: AtomicBool,
}

impl FakeBackend {
    pub const TRANSFORM: &'static str = "mediajob-h264-720p";

    pub fn new() -> Self {
        Self::default()
    }

    /// Storage container backing a fake asset.
    pub fn asset_container(asset_name: &str) -> String {
        format!("asset-{}", asset_name)
    }

    pub fn insert_job(&self, job: BackendJob) {
        self.jobs
            .lock()
            .unwrap()
            .insert(job.name.to_string(), job);
    }

    pub fn insert_asset(&self, name: &str) {
        self.assets.lock().unwrap().insert(
            name.to_string(),
            BackendAsset {
                name: name.to_string(),
                container: Self::asset_container(name),
            },
        );
    }

    /// Snapshots returned by successive `get_job` calls; the last one sticks.
    pub fn script(&self, job_name: &JobName, snapshots: Vec<BackendJob>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(job_name.to_string(), snapshots.into());
    }

    pub fn has_job(&self, job_name: &JobName) -> bool {
        self.jobs.lock().unwrap().contains_key(job_name.as_str())
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.lock().unwrap().contains_key(name)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    fn take_failing_delete(&self) -> bool {
        self.failing_deletes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl TranscodeBackend for FakeBackend {
    fn transform_name(&self) -> &str {
        Self::TRANSFORM
    }

    async fn ensure_transform(&self, _transform_name: &str) -> TranscodeResult<()> {
        self.calls.hit("ensure_transform");
        Ok(())
    }

    async fn create_asset(&self, name: &str, _description: &str) -> TranscodeResult<AssetRef> {
        self.calls.hit("create_asset");
        self.insert_asset(name);
        Ok(AssetRef {
            name: name.to_string(),
            container: Some(Self::asset_container(name)),
        })
    }

    async fn create_job(
        &self,
        _transform_name: &str,
        job_name: &JobName,
        _input_url: &str,
        output_asset: &AssetRef,
    ) -> TranscodeResult<JobHandle> {
        self.calls.hit("create_job");
        if self.job_lands_before_delay.load(Ordering::SeqCst) {
            self.insert_job(job(job_name, BackendJobState::Queued, &output_asset.name, 0.0));
        }
        let delay = *self.create_job_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_jobs.load(Ordering::SeqCst) {
            return Err(TranscodeError::api(400, "BadRequest", "Input file is not reachable"));
        }
        self.insert_job(job(job_name, BackendJobState::Queued, &output_asset.name, 0.0));
        Ok(JobHandle {
            name: job_name.clone(),
            state: BackendJobState::Queued,
        })
    }

    async fn get_job(&self, job_name: &JobName) -> TranscodeResult<Option<BackendJob>> {
        self.calls.hit("get_job");
        let mut jobs = self.jobs.lock().unwrap();
        if !jobs.contains_key(job_name.as_str()) {
            return Ok(None);
        }

        let mut scripts = self.scripts.lock().unwrap();
        if let Some(script) = scripts.get_mut(job_name.as_str()) {
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            if let Some(snapshot) = next {
                jobs.insert(job_name.to_string(), snapshot);
            }
        }

        Ok(jobs.get(job_name.as_str()).cloned())
    }

    async fn get_asset(&self, name: &str) -> TranscodeResult<Option<BackendAsset>> {
        self.calls.hit("get_asset");
        Ok(self.assets.lock().unwrap().get(name).cloned())
    }

    async fn delete_asset(&self, name: &str) -> TranscodeResult<()> {
        self.calls.hit("delete_asset");
        if self.take_failing_delete() {
            return Err(TranscodeError::api(503, "ServiceUnavailable", "Try again later"));
        }
        self.assets.lock().unwrap().remove(name);
        Ok(())
    }

    async fn delete_job(&self, job_name: &JobName) -> TranscodeResult<()> {
        self.calls.hit("delete_job");
        if self.take_failing_delete() {
            return Err(TranscodeError::api(503, "ServiceUnavailable", "Try again later"));
        }
        self.jobs.lock().unwrap().remove(job_name.as_str());
        self.scripts.lock().unwrap().remove(job_name.as_str());
        Ok(())
    }
}

// =============================================================================
// Snapshot builders
// =============================================================================

/// A job with one output writing to `asset_name`.
pub fn job(name: &JobName, state: BackendJobState, asset_name: &str, progress: f64) -> BackendJob {
    BackendJob {
        name: name.clone(),
        state: state.clone(),
        outputs: vec![JobOutput {
            asset_name: Some(asset_name.to_string()),
            state: Some(state),
            progress,
            error: None,
        }],
    }
}

/// A failed job whose first output reports `details` in order.
pub fn failed_job(name: &JobName, asset_name: &str, progress: f64, details: &[&str]) -> BackendJob {
    let mut job = job(name, BackendJobState::Error, asset_name, progress);
    job.outputs[0].error = Some(JobOutputError {
        code: Some("ContentMalformed".to_string()),
        message: Some("Encoding failed".to_string()),
        details: details
            .iter()
            .map(|message| JobErrorDetail {
                code: None,
                message: message.to_string(),
            })
            .collect(),
    });
    job
}
