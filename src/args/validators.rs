use super::types::{Args, Command};

pub(super) fn validate(args: &Args) -> Result<(), String> {
    if args.config.is_none() && !args.dry_run {
        return Err("--config is required unless --dry-run is given".to_string());
    }

    match &args.command {
        Command::Upload {
            bucket,
            name,
            owner,
            ..
        } => {
            if bucket.trim().is_empty() {
                return Err("--bucket must not be empty".to_string());
            }
            match (name, owner) {
                (Some(n), _) if n.trim().is_empty() => {
                    Err("--name must not be empty".to_string())
                }
                (Some(_), _) => Ok(()),
                (None, Some(_)) if super::types::known_bucket(bucket).is_none() => Err(format!(
                    "cannot generate a name for unknown bucket '{bucket}', pass --name"
                )),
                (None, Some(_)) => Ok(()),
                (None, None) => Err("either --name or --owner is required".to_string()),
            }
        }
        Command::UploadDocuments { user_id, .. } => {
            if user_id.trim().is_empty() {
                Err("--user-id must not be empty".to_string())
            } else {
                Ok(())
            }
        }
        Command::PublicUrl { bucket, name } => {
            if bucket.trim().is_empty() || name.trim().is_empty() {
                Err("--bucket and --name must not be empty".to_string())
            } else {
                Ok(())
            }
        }
    }
}
