use serde::Serialize;

use satsbot_core::{SourceChain, SourceDescriptor};

use crate::cli::SourcesArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceDescriptor>,
}

pub fn run(chain: &SourceChain, args: &SourcesArgs) -> Result<(), CliError> {
    let data = SourcesResponseData {
        sources: chain.descriptors(),
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&data)?
    } else {
        serde_json::to_string(&data)?
    };
    println!("{rendered}");
    Ok(())
}
