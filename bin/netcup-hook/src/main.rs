use lib_netcup::dns::HookErrors;
use netcup_hook::{init_logging, run, CliInput};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), HookErrors> {
    init_logging();

    let args = CliInput::new();
    run(args).await
}
