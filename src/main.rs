use std::path::Path;

use oapi_type_model::{CompilerConfig, SchemaCompiler};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // let config = CompilerConfig::from_json_file(Path::new("oapi-types.json"))?;
    let config = CompilerConfig::default();
    let compiler = SchemaCompiler::new(config);
    let model = compiler.compile_file(Path::new("openapi.json"))?;

    println!("{}", serde_json::to_string_pretty(&model)?);

    Ok(())
}
