use anyhow::{Context, anyhow};
use std::sync::Arc;
use std::sync::mpsc;

use crate::args::{Args, Command, known_bucket};
use crate::config::StoreConfig;
use crate::interfaces::ObjectStore;
use crate::naming::{self, Bucket};
use crate::source::{FsResolver, SourceLocator};
use crate::storage::build_store;
use crate::upload::{ChannelCallback, ImageUploader, UploadOutcome, UploadRequest};

/// Object name for an upload when the caller gave only an owner id.
pub fn generated_file_name(bucket: Bucket, owner: &str, source: &SourceLocator, millis: i64) -> String {
    match bucket {
        Bucket::DoctorCertificates => {
            naming::certificate_key(owner, millis, 0, &source.extension_or_default())
        }
        Bucket::DoctorProfiles => naming::doctor_profile_key(owner, millis),
        Bucket::UserProfiles => naming::user_profile_key(owner, millis),
        Bucket::ChatImages => naming::chat_image_key(owner, millis),
    }
}

fn load_config(args: &Args) -> anyhow::Result<StoreConfig> {
    let mut config = match (&args.config, args.dry_run) {
        (_, true) => StoreConfig::memory(),
        (Some(path), false) => StoreConfig::load(path)
            .with_context(|| format!("loading store config {}", path.display()))?,
        (None, false) => return Err(anyhow!("no store configuration given")),
    };
    if let Some(root) = &args.source_root {
        config.source_root = Some(root.clone());
    }
    Ok(config)
}

fn build_uploader(config: &StoreConfig, store: Arc<dyn ObjectStore>) -> ImageUploader {
    let resolver = match &config.source_root {
        Some(root) => FsResolver::with_root(root),
        None => FsResolver::new(),
    };
    ImageUploader::new(store, Arc::new(resolver))
        .with_max_concurrent_uploads(config.max_concurrent_uploads)
}

/// Run the command selected on the command line.
///
/// Public URLs go to stdout, one per line.
pub fn run_app(args: &Args) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let store = build_store(&config)?;

    match &args.command {
        Command::PublicUrl { bucket, name } => {
            println!("{}", store.public_url(bucket, name));
            Ok(())
        }
        Command::Upload {
            source,
            bucket,
            name,
            owner,
            ..
        } => {
            let locator = SourceLocator::new(source.as_str());
            let file_name = match (name, owner, known_bucket(bucket)) {
                (Some(name), _, _) => name.clone(),
                (None, Some(owner), Some(known)) => {
                    generated_file_name(known, owner, &locator, naming::now_millis())
                }
                _ => return Err(anyhow!("cannot determine an object name for bucket '{bucket}'")),
            };
            let request = UploadRequest::new(locator, bucket.as_str(), file_name)
                .with_overwrite(args.command.overwrite_policy());

            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            let uploader = build_uploader(&config, store);

            // the upload runs on the runtime's workers; this thread only waits for the outcome
            let (tx, rx) = mpsc::channel();
            {
                let _guard = runtime.enter();
                let _task = uploader.upload_with_callback(request, ChannelCallback::new(tx));
            }
            match rx.recv().context("upload task ended without reporting")? {
                UploadOutcome::Success(url) => {
                    println!("{url}");
                    Ok(())
                }
                UploadOutcome::Failure(reason) => Err(anyhow!(reason)),
            }
        }
        Command::UploadDocuments { user_id, sources } => {
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            let uploader = build_uploader(&config, store);
            let locators = sources.iter().map(|s| SourceLocator::new(s.as_str())).collect();
            let progress = Arc::new(|uploaded: usize, total: usize| {
                tracing::info!("uploaded {uploaded}/{total} documents");
            });

            let outcome = runtime
                .block_on(uploader.upload_documents(user_id, locators, progress))
                .map_err(|e| anyhow!(e.reason()))?;

            for url in &outcome.urls {
                println!("{url}");
            }
            for failure in &outcome.failures {
                eprintln!("warn: {}", failure.reason());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_follow_bucket_layout() {
        let source = SourceLocator::new("scan.png");
        assert_eq!(
            generated_file_name(Bucket::DoctorCertificates, "u1", &source, 3),
            "u1/certificate_3_0.png"
        );
        assert_eq!(
            generated_file_name(Bucket::ChatImages, "c9", &source, 3),
            "chat_images/c9/3.jpg"
        );
        assert_eq!(
            generated_file_name(Bucket::UserProfiles, "p", &source, 3),
            "user_profile_p_3.jpg"
        );
    }

    #[test]
    fn dry_run_uploads_into_memory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cert.jpg"), vec![7u8; 16]).unwrap();

        let args = Args {
            config: None,
            dry_run: true,
            source_root: Some(dir.path().to_path_buf()),
            verbose: 0,
            command: Command::Upload {
                source: "local:///cert.jpg".into(),
                bucket: "doctor-certificates".into(),
                name: Some("doc42.jpg".into()),
                owner: None,
                overwrite: false,
            },
        };
        assert!(run_app(&args).is_ok());
    }

    #[test]
    fn dry_run_reports_missing_source() {
        let args = Args {
            config: None,
            dry_run: true,
            source_root: None,
            verbose: 0,
            command: Command::Upload {
                source: "/definitely/not/here.jpg".into(),
                bucket: "user-profiles".into(),
                name: None,
                owner: Some("p1".into()),
                overwrite: false,
            },
        };
        let err = run_app(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to read image file"));
    }
}
