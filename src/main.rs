use abi_multicall::{CallBatch, CallOutcome, FunctionSignature, Multicall, RpcClient, Settings};
use eyre::{Result, WrapErr};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().wrap_err("failed to load multicall settings")?;

    let level = settings.log_level.parse().unwrap_or(LevelFilter::Info);
    SimpleLogger::new().with_level(level).init()?;

    let client = RpcClient::connect(&settings.rpc_url)?;
    let multicall = Multicall::new(client, settings.multicall.clone());

    let token_of_owner_by_index = FunctionSignature::parse(
        "function tokenOfOwnerByIndex(address owner, uint256 index) view returns (uint256)",
    )?;

    let query = &settings.query;
    let mut batch = CallBatch::new();
    for index in 0..query.count {
        batch.add(
            index,
            query.contract,
            &token_of_owner_by_index,
            &[query.owner.into(), index.into()],
        )?;
    }

    info!(
        "querying {} tokens of {} on {}",
        query.count, query.owner, query.contract
    );
    for (index, outcome) in multicall.execute(batch).await? {
        match outcome {
            CallOutcome::Success(value) => match value.as_uint() {
                Some(token_id) => println!("{index}: {token_id}"),
                None => println!("{index}: {value:?}"),
            },
            CallOutcome::Failed(failed) => warn!("{index}: {failed}"),
        }
    }

    Ok(())
}
