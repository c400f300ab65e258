use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;

use panel_anchor::anchor::{verify_contract_abi, AbiCheck, AnchorConfig, DEFAULT_ABI_PATH};
use panel_anchor::crypto::OracleSigningKey;
use panel_anchor::domain::{extract_panel_id, ProvenanceMetadata, DEFAULT_EVENT_TYPE};
use panel_anchor::infra::{seal_event, AlloyLedgerClient};
use panel_anchor::telemetry::{init_telemetry, TelemetryConfig};
use panel_anchor::{AnchorContext, AnchorPipeline, AssetId, EventType};

fn print_help() {
    eprintln!(
        "\
panel-anchor-admin

USAGE:
  panel-anchor-admin <command> [options]

COMMANDS:
  hash                            Compute the event digest for a record offline
  check-abi                       Verify the contract ABI declares addPanelEvent
  anchor                          Validate and anchor a record once

hash OPTIONS:
  --record <path>                 (required) JSON asset record
  --event-type <type>             (default: installation)
  --anchored-at <unix_secs>       (default: now)
  --wallet <address>              (default: address of PRIVATE_KEY)

check-abi OPTIONS:
  --abi-path <path>               (default: env ABI_PATH or contract_abi.json)

anchor OPTIONS:
  --record <path>                 (required) JSON asset record
  --event-type <type>             (default: installation)

ENV (anchor):
  INFURA_URL, CONTRACT_ADDRESS, PRIVATE_KEY, plus the optional fee and timeout settings
"
    );
}

fn take_value(args: &mut VecDeque<String>, flag: &str) -> anyhow::Result<String> {
    args.pop_front()
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn read_record(path: &PathBuf) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn default_wallet() -> anyhow::Result<Address> {
    let key = std::env::var("PRIVATE_KEY")
        .map_err(|_| anyhow::anyhow!("pass --wallet or set PRIVATE_KEY"))?;
    Ok(OracleSigningKey::from_hex(&key)?.address())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: VecDeque<String> = std::env::args().skip(1).collect();
    let Some(command) = args.pop_front() else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "-h" | "--help" | "help") {
        print_help();
        return Ok(());
    }

    match command.as_str() {
        "hash" => {
            let mut record_path: Option<PathBuf> = None;
            let mut event_type = DEFAULT_EVENT_TYPE.to_string();
            let mut anchored_at: Option<u64> = None;
            let mut wallet: Option<Address> = None;

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--record" => record_path = Some(take_value(&mut args, "--record")?.into()),
                    "--event-type" => event_type = take_value(&mut args, "--event-type")?,
                    "--anchored-at" => {
                        anchored_at = Some(take_value(&mut args, "--anchored-at")?.parse()?);
                    }
                    "--wallet" => wallet = Some(take_value(&mut args, "--wallet")?.parse()?),
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let record_path =
                record_path.ok_or_else(|| anyhow::anyhow!("--record is required"))?;
            let mut record = read_record(&record_path)?;

            let wallet = match wallet {
                Some(w) => w,
                None => default_wallet()?,
            };
            let anchored_at = anchored_at.unwrap_or_else(|| chrono::Utc::now().timestamp() as u64);
            let metadata = ProvenanceMetadata {
                oracle_wallet: wallet.to_checksum(None),
                anchored_at,
            };

            let asset_id = AssetId::parse(extract_panel_id(&record)?)?;
            let event_type = EventType::parse(event_type)?;
            let event = seal_event(&mut record, asset_id, event_type, &metadata)?;

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "panel_id": event.asset_id.as_str(),
                    "event_type": event.event_type.as_str(),
                    "oracle_wallet": metadata.oracle_wallet,
                    "anchored_at": metadata.anchored_at,
                    "event_hash": event.digest_hex(),
                }))?
            );
            Ok(())
        }
        "check-abi" => {
            let mut abi_path: Option<PathBuf> = None;
            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--abi-path" => abi_path = Some(take_value(&mut args, "--abi-path")?.into()),
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            let abi_path = abi_path
                .or_else(|| std::env::var("ABI_PATH").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ABI_PATH));

            match verify_contract_abi(&abi_path)? {
                AbiCheck::Verified => {
                    println!("ok: {} declares addPanelEvent", abi_path.display());
                    Ok(())
                }
                AbiCheck::NotFound => anyhow::bail!("ABI file not found: {}", abi_path.display()),
            }
        }
        "anchor" => {
            let mut record_path: Option<PathBuf> = None;
            let mut event_type = DEFAULT_EVENT_TYPE.to_string();

            while let Some(arg) = args.pop_front() {
                match arg.as_str() {
                    "--record" => record_path = Some(take_value(&mut args, "--record")?.into()),
                    "--event-type" => event_type = take_value(&mut args, "--event-type")?,
                    "-h" | "--help" => {
                        print_help();
                        return Ok(());
                    }
                    other => anyhow::bail!("unexpected argument: {other}"),
                }
            }

            init_telemetry(&TelemetryConfig::from_env())
                .map_err(|e| anyhow::anyhow!("telemetry init failed: {e}"))?;

            let record_path =
                record_path.ok_or_else(|| anyhow::anyhow!("--record is required"))?;
            let record = read_record(&record_path)?;

            let config = AnchorConfig::from_env()?;
            verify_contract_abi(&config.abi_path)?;
            let ledger = Arc::new(AlloyLedgerClient::new(&config.rpc_url)?);
            let pipeline = AnchorPipeline::new(AnchorContext::from_config(&config, ledger));

            let outcome = pipeline.process(&record, &event_type).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("unknown command: {other}")
        }
    }
}
