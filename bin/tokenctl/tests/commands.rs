//! Command dispatch against an in-memory token backend.


use alloy_primitives::U256;
use clap::Parser;
use setup::{dev_signer, ledger_client, Ledger, ALICE, BOB};
use std::{sync::atomic::Ordering, time::Duration};
use token::TokenError;
use tokenctl::{
    execute, metrics::Metrics, parse_amount, poll_balances, signing_key, watch, Command, Outcome,
};

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn parse(args: &[&str]) -> Command {
    Args::try_parse_from(std::iter::once("tokenctl").chain(args.iter().copied()))
        .unwrap()
        .command
}

#[test]
fn test_parse_commands() {
    assert_eq!(
        parse(&["balance", ALICE]),
        Command::Balance {
            owner: ALICE.into()
        }
    );
    assert_eq!(parse(&["total-supply"]), Command::TotalSupply);
    assert_eq!(
        parse(&["transfer-from", ALICE, BOB, "10"]),
        Command::TransferFrom {
            from: ALICE.into(),
            to: BOB.into(),
            amount: "10".into()
        }
    );
    assert_eq!(
        parse(&["watch", ALICE, BOB]),
        Command::Watch {
            owners: vec![ALICE.into(), BOB.into()],
            interval_secs: 30
        }
    );
}

#[test]
fn test_watch_needs_owner() {
    assert!(Args::try_parse_from(["tokenctl", "watch"]).is_err());
}

#[test]
fn test_watch_rejects_zero_interval() {
    assert!(Args::try_parse_from(["tokenctl", "watch", ALICE, "--interval-secs", "0"]).is_err());
}

#[test]
fn test_method_names() {
    assert_eq!(parse(&["allowance", ALICE, BOB]).method(), "allowance");
    assert_eq!(parse(&["approve", BOB, "1"]).method(), "approve");
    assert!(parse(&["transfer", BOB, "1"]).is_write());
    assert!(!parse(&["balance", BOB]).is_write());
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("1000").unwrap(), U256::from(1000));
    assert_eq!(parse_amount(" 0xff ").unwrap(), U256::from(255));
    assert_eq!(parse_amount("0").unwrap(), U256::ZERO);
    assert_eq!(
        parse_amount("115792089237316195423570985008687907853269984665640564039457584007913129639935")
            .unwrap(),
        U256::MAX
    );

    assert!(parse_amount("").is_err());
    assert!(parse_amount("-1").is_err());
    assert!(parse_amount("1.5").is_err());
    assert!(parse_amount("0xzz").is_err());
}

#[tokio::test]
async fn test_execute_reads() {
    let client = ledger_client(Ledger::funded());
    let metrics = Metrics::new();

    let outcome = execute(&client, &parse(&["balance", ALICE]), None, &metrics)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Amount {
            method: "balanceOf",
            amount: U256::from(500)
        }
    );
    assert_eq!(outcome.render(false), "500");

    let outcome = execute(&client, &parse(&["allowance", ALICE, BOB]), None, &metrics)
        .await
        .unwrap();
    assert_eq!(outcome.render(false), "42");

    let outcome = execute(&client, &Command::TotalSupply, None, &metrics)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&outcome.render(true)).unwrap();
    assert_eq!(json["method"], "totalSupply");
    assert_eq!(json["amount"], "1000000");
}

#[tokio::test]
async fn test_execute_writes() {
    let client = ledger_client(Ledger::default());
    let metrics = Metrics::new();
    let key = dev_signer();

    for args in [
        &["approve", BOB, "5"][..],
        &["transfer", BOB, "0x10"][..],
        &["transfer-from", ALICE, BOB, "7"][..],
    ] {
        let outcome = execute(&client, &parse(args), Some(&key), &metrics)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Submitted { .. }));
    }

    let writes = client.contract().writes.lock().unwrap().clone();
    assert_eq!(
        writes,
        vec![
            ("approve", U256::from(5), 48_000),
            ("transfer", U256::from(16), 40_000),
            ("transferFrom", U256::from(7), 50_000),
        ]
    );
}

#[tokio::test]
async fn test_submitted_render() {
    let client = ledger_client(Ledger::default());
    let key = dev_signer();

    let outcome = execute(&client, &parse(&["transfer", BOB, "1"]), Some(&key), &Metrics::new())
        .await
        .unwrap();
    let Outcome::Submitted { handle, .. } = &outcome else {
        panic!("expected a submission, got {outcome:?}");
    };

    assert_eq!(outcome.render(false), handle.tx_hash.to_string());

    let json: serde_json::Value = serde_json::from_str(&outcome.render(true)).unwrap();
    assert_eq!(json["method"], "transfer");
    assert_eq!(json["nonce"], 0);
    assert_eq!(json["gas_limit"], 40_000);
    assert_eq!(json["gas_price"], "2000000000");
    assert_eq!(
        json["from"].as_str().unwrap().to_lowercase(),
        key.address().to_string().to_lowercase()
    );
}

#[tokio::test]
async fn test_write_without_key() {
    let client = ledger_client(Ledger::default());

    let err = execute(&client, &parse(&["transfer", BOB, "1"]), None, &Metrics::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("private key"));
    assert!(client.contract().writes.lock().unwrap().is_empty());
}

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[test]
fn test_signing_key_required_for_writes() {
    for args in [
        &["approve", BOB, "1"][..],
        &["transfer", BOB, "1"][..],
        &["transfer-from", ALICE, BOB, "1"][..],
    ] {
        let err = signing_key(&parse(args), None).unwrap_err();
        assert!(err.to_string().contains("needs a private key"), "{err}");
    }
}

#[test]
fn test_signing_key_rejects_malformed_key() {
    let err = signing_key(&parse(&["transfer", BOB, "1"]), Some("0xnotakey")).unwrap_err();
    assert!(err.to_string().contains("Invalid private key"), "{err}");
}

#[test]
fn test_signing_key_parses_for_writes_only() {
    let signer = signing_key(&parse(&["transfer", BOB, "1"]), Some(DEV_KEY))
        .unwrap()
        .unwrap();
    assert_eq!(signer.address(), dev_signer().address());

    assert!(signing_key(&parse(&["balance", ALICE]), None).unwrap().is_none());
    assert!(signing_key(&parse(&["balance", ALICE]), Some("garbage"))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_bad_amount_is_not_submitted() {
    let client = ledger_client(Ledger::default());

    let result = execute(
        &client,
        &parse(&["approve", BOB, "lots"]),
        Some(&dev_signer()),
        &Metrics::new(),
    )
    .await;
    assert!(result.is_err());
    assert!(client.contract().writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_execute_surfaces_token_errors() {
    let ledger = Ledger::funded();
    ledger.fail.store(true, Ordering::SeqCst);
    let client = ledger_client(ledger);

    let err = execute(&client, &parse(&["balance", ALICE]), None, &Metrics::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TokenError>(),
        Some(TokenError::RemoteCall { method: "balanceOf", .. })
    ));

    let err = execute(&client, &parse(&["balance", "0x12"]), None, &Metrics::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TokenError>(),
        Some(TokenError::Parse { .. })
    ));
}

#[tokio::test]
async fn test_poll_balances_continues_past_errors() {
    let client = ledger_client(Ledger::funded());
    let owners = vec![ALICE.to_string(), "bogus".to_string(), BOB.to_string()];

    let results = poll_balances(&client, &owners, &Metrics::new()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].1, Ok(U256::from(500)));
    assert!(matches!(results[1].1, Err(TokenError::Parse { .. })));
    assert_eq!(results[2].1, Ok(U256::from(7)));
}

#[tokio::test]
async fn test_watch_polls_until_shutdown() {
    let client = ledger_client(Ledger::funded());
    let owners = vec![ALICE.to_string()];

    let rounds = watch(
        &client,
        &owners,
        Duration::from_millis(10),
        &Metrics::new(),
        tokio::time::sleep(Duration::from_millis(200)),
    )
    .await;

    assert!(rounds >= 2, "only {rounds} rounds");
}

#[tokio::test]
async fn test_watch_shutdown_interrupts_slow_poll() {
    let ledger = Ledger {
        delay: Some(Duration::from_secs(30)),
        ..Ledger::funded()
    };
    let client = ledger_client(ledger);
    let owners = vec![ALICE.to_string(), BOB.to_string()];

    let rounds = tokio::time::timeout(
        Duration::from_secs(5),
        watch(
            &client,
            &owners,
            Duration::from_secs(1),
            &Metrics::new(),
            tokio::time::sleep(Duration::from_millis(50)),
        ),
    )
    .await
    .expect("shutdown did not interrupt the poll");

    assert_eq!(rounds, 0);
}
