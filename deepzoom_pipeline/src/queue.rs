use crate::{JobParameters, JobReport, PyramidJob};
use anyhow::{Context, Result};
use deepzoom_core::EventBus;
use deepzoom_image::ImageEngine;
use std::sync::Arc;

/// Runs pyramid jobs one after another.
///
/// Jobs share the image engine and the event bus. A failing job is reported and the next job
/// starts as if nothing happened.
pub struct JobQueue {
	engine: Arc<dyn ImageEngine>,
	events: EventBus,
	jobs: Vec<JobParameters>,
}

impl JobQueue {
	pub fn new(engine: Arc<dyn ImageEngine>, events: EventBus) -> Self {
		Self {
			engine,
			events,
			jobs: Vec::new(),
		}
	}

	pub fn push(&mut self, parameters: JobParameters) {
		self.jobs.push(parameters);
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	/// Run every job. Returns one result per job, in queue order.
	pub async fn run(&self) -> Vec<Result<JobReport>> {
		let mut results = Vec::with_capacity(self.jobs.len());
		for (index, parameters) in self.jobs.iter().enumerate() {
			log::debug!("starting job {} of {}: '{}'", index + 1, self.jobs.len(), parameters.map_name);
			let job = PyramidJob::new(parameters.clone(), self.engine.clone(), self.events.clone());
			let result = job
				.run()
				.await
				.with_context(|| format!("job '{}' failed", parameters.map_name));
			if let Err(error) = &result {
				log::warn!("{error:#}");
			}
			results.push(result);
		}
		results
	}
}

impl Extend<JobParameters> for JobQueue {
	fn extend<I: IntoIterator<Item = JobParameters>>(&mut self, iter: I) {
		self.jobs.extend(iter);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use deepzoom_core::{DeepZoomError, ErrorKind};
	use deepzoom_image::{DynamicImageEngine, test_images};

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_failing_job_does_not_stop_the_queue() {
		let dir = tempfile::tempdir().unwrap();
		let image_path = dir.path().join("a.png");
		test_images::save(&test_images::gradient_rgba(16, 16), &image_path);

		let mut queue = JobQueue::new(Arc::new(DynamicImageEngine::new()), EventBus::new());
		let mut broken = JobParameters::new(&image_path, "broken");
		broken.output_root = dir.path().to_path_buf();
		broken.tile_size_override = Some("abc".to_string());
		let mut good = JobParameters::new(&image_path, "good");
		good.output_root = dir.path().to_path_buf();
		good.tile_size_override = Some("8".to_string());
		queue.extend([broken, good]);
		assert_eq!(queue.len(), 2);

		let results = queue.run().await;
		assert_eq!(results.len(), 2);

		let error = results[0].as_ref().unwrap_err();
		assert_eq!(DeepZoomError::kind_of(error), Some(ErrorKind::InvalidParameter));
		assert!(error.to_string().starts_with("job 'broken' failed"));

		let report = results[1].as_ref().unwrap();
		assert_eq!(report.map_name, "good");
		assert!(report.is_complete());
		assert!(dir.path().join("good/config.json").is_file());
		assert!(!dir.path().join("broken").exists());
	}

	#[tokio::test]
	async fn test_empty_queue() {
		let queue = JobQueue::new(Arc::new(DynamicImageEngine::new()), EventBus::new());
		assert!(queue.is_empty());
		assert!(queue.run().await.is_empty());
	}
}
