use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::naming::Bucket;
use crate::upload::OverwritePolicy;
use crate::utils::path_utils::{check_readable_dir, check_readable_file};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON store configuration (backend, credential sources, limits)
    #[arg(short = 'c', long, value_name = "PATH", value_parser = check_readable_file)]
    pub config: Option<PathBuf>,

    /// Upload into an in-memory store instead of the configured backend
    #[arg(long)]
    pub dry_run: bool,

    /// Directory that local:// locators and relative paths resolve under
    #[arg(long, value_name = "DIR", value_parser = check_readable_dir)]
    pub source_root: Option<PathBuf>,

    /// Print extra stuff (use -v -v or --verbose --verbose for even more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Upload one file and print its public URL
    Upload {
        /// File to upload (file://, local:// or a path)
        #[arg(short, long)]
        source: String,

        /// Destination bucket
        #[arg(short, long)]
        bucket: String,

        /// Object name; generated from --owner when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// User or chat id used to generate the object name
        #[arg(long)]
        owner: Option<String>,

        /// Replace an existing object with the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Upload a user's verification documents to doctor-certificates
    UploadDocuments {
        /// Owner of the documents
        #[arg(short, long)]
        user_id: String,

        /// Documents to upload
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Print the public URL an object would have
    PublicUrl {
        #[arg(short, long)]
        bucket: String,

        #[arg(short, long)]
        name: String,
    },
}

impl Command {
    pub fn overwrite_policy(&self) -> OverwritePolicy {
        match self {
            Command::Upload {
                overwrite: true, ..
            } => OverwritePolicy::Overwrite,
            _ => OverwritePolicy::Reject,
        }
    }
}

/// Known bucket, or `None` for a bucket this app does not define.
pub fn known_bucket(raw: &str) -> Option<Bucket> {
    Bucket::parse(raw)
}

impl Args {
    /// Validate argument combinations clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid for the selected command.
    pub fn validate(&self) -> Result<(), String> {
        super::validators::validate(self)
    }
}
