mod common;

use anyhow::Result;
use common::{ACCOUNT_A, ACCOUNT_B, StandardAccounts, assert_close, memory_service, test_service};
use fxledger::application::{LedgerErrorKind, LedgerService};
use fxledger::storage::RecordStore;

async fn deposits_accumulate<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    let (account, _) = StandardAccounts::open(service).await?;
    assert_eq!(account.balance, 0.0);

    let account = service.deposit(ACCOUNT_A, 20.0, None).await?;
    assert_eq!(account.balance, 20.0);

    let account = service.deposit(ACCOUNT_A, 23.0, None).await?;
    assert_eq!(account.balance, 43.0);
    Ok(())
}

async fn deposit_then_withdraw<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    StandardAccounts::open(service).await?;

    service.deposit(ACCOUNT_A, 20.0, None).await?;
    let account = service.withdraw(ACCOUNT_A, 13.0, None).await?;
    assert_eq!(account.balance, 7.0);

    // Reads back the committed value
    assert_eq!(service.get_account(ACCOUNT_A).await?.balance, 7.0);
    Ok(())
}

async fn overdraft_is_rejected<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    StandardAccounts::open(service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;

    let err = service.withdraw(ACCOUNT_A, 25.0, None).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::InsufficientFunds);
    assert_eq!(service.get_account(ACCOUNT_A).await?.balance, 20.0);
    Ok(())
}

async fn transfer_moves_funds<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    StandardAccounts::open(service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;
    service.deposit(ACCOUNT_B, 20.0, Some("USD")).await?;

    let result = service.transfer(ACCOUNT_A, ACCOUNT_B, 12.0, None).await?;
    assert_eq!(result.withdrawal.account_number, ACCOUNT_A);
    assert_eq!(result.withdrawal.balance, 8.0);
    assert_eq!(result.deposit.account_number, ACCOUNT_B);
    assert_eq!(result.deposit.balance, 32.0);

    assert_eq!(service.get_account(ACCOUNT_A).await?.balance, 8.0);
    assert_eq!(service.get_account(ACCOUNT_B).await?.balance, 32.0);
    Ok(())
}

async fn foreign_currency_withdrawal<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    StandardAccounts::open(service).await?;
    service.deposit(ACCOUNT_A, 20.0, Some("USD")).await?;

    let account = service
        .withdraw(ACCOUNT_A, 10.0 * 411.57, Some("NGN"))
        .await?;
    assert_close(account.balance, 10.0);
    Ok(())
}

async fn balance_in_foreign_currency<S: RecordStore>(service: &LedgerService<S>) -> Result<()> {
    StandardAccounts::open(service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;

    assert_close(service.get_balance_in(ACCOUNT_A, Some("NGN")).await?, 8231.4);
    assert_close(service.get_balance_in(ACCOUNT_A, Some("naira")).await?, 8231.4);
    assert_eq!(service.get_balance_in(ACCOUNT_A, None).await?, 20.0);
    Ok(())
}

#[tokio::test]
async fn test_deposits_accumulate() -> Result<()> {
    deposits_accumulate(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    deposits_accumulate(&service).await
}

#[tokio::test]
async fn test_deposit_then_withdraw() -> Result<()> {
    deposit_then_withdraw(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    deposit_then_withdraw(&service).await
}

#[tokio::test]
async fn test_overdraft_is_rejected() -> Result<()> {
    overdraft_is_rejected(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    overdraft_is_rejected(&service).await
}

#[tokio::test]
async fn test_transfer_moves_funds() -> Result<()> {
    transfer_moves_funds(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    transfer_moves_funds(&service).await
}

#[tokio::test]
async fn test_foreign_currency_withdrawal() -> Result<()> {
    foreign_currency_withdrawal(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    foreign_currency_withdrawal(&service).await
}

#[tokio::test]
async fn test_balance_in_foreign_currency() -> Result<()> {
    balance_in_foreign_currency(&memory_service()).await?;
    let (service, _temp) = test_service().await?;
    balance_in_foreign_currency(&service).await
}

#[tokio::test]
async fn test_deposit_withdraw_round_trip() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;
    service.deposit(ACCOUNT_A, 3.5, None).await?;

    let legs = [(1.25, "USD"), (500.0, "JPY"), (77.7, "cny"), (1000.0, "Naira")];
    for (amount, currency) in legs {
        let before = service.get_account(ACCOUNT_A).await?.balance;
        service.deposit(ACCOUNT_A, amount, Some(currency)).await?;
        let after = service.withdraw(ACCOUNT_A, amount, Some(currency)).await?;
        assert_close(after.balance, before);
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_account_is_reported() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;
    let missing = 42;

    let err = service.deposit(missing, 10.0, None).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::AccountNotFound);

    let err = service.withdraw(missing, 10.0, None).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::AccountNotFound);

    let err = service.get_account(missing).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::AccountNotFound);

    let err = service.get_balance_in(missing, Some("NGN")).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::AccountNotFound);
    Ok(())
}

#[tokio::test]
async fn test_unknown_currency_is_reported() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;

    let err = service.deposit(ACCOUNT_A, 10.0, Some("EUR")).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::InvalidCurrency);

    let err = service.withdraw(ACCOUNT_A, 10.0, Some("")).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::InvalidCurrency);

    let err = service
        .get_balance_in(ACCOUNT_A, Some("GBP"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::InvalidCurrency);

    for name in ["USD", "usd", "Usd"] {
        service.deposit(ACCOUNT_A, 1.0, Some(name)).await?;
    }
    assert_eq!(service.get_account(ACCOUNT_A).await?.balance, 23.0);
    Ok(())
}

#[tokio::test]
async fn test_withdraw_from_empty_account() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;

    let err = service.withdraw(ACCOUNT_A, 10.0, None).await.unwrap_err();
    assert_eq!(err.kind(), LedgerErrorKind::InsufficientFunds);
    assert_eq!(service.get_account(ACCOUNT_A).await?.balance, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_withdraw_entire_balance() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;

    let account = service.withdraw(ACCOUNT_A, 20.0, None).await?;
    assert_eq!(account.balance, 0.0);
    Ok(())
}

#[tokio::test]
async fn test_transfer_in_foreign_currency() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;
    service.deposit(ACCOUNT_A, 20.0, None).await?;

    let result = service
        .transfer(ACCOUNT_A, ACCOUNT_B, 6.46 * 5.0, Some("CNY"))
        .await?;
    assert_close(result.withdrawal.balance, 15.0);
    assert_close(result.deposit.balance, 5.0);
    Ok(())
}

#[tokio::test]
async fn test_sample_walkthrough() -> Result<()> {
    let service = memory_service();
    StandardAccounts::open(&service).await?;

    // A deposits 10 dollars
    let a = service.deposit(ACCOUNT_A, 10.0, None).await?;
    assert_eq!(a.balance, 10.0);

    // B deposits 20 dollars
    let b = service.deposit(ACCOUNT_B, 20.0, None).await?;
    assert_eq!(b.balance, 20.0);

    // B sends 15 dollars to A
    let result = service.transfer(ACCOUNT_B, ACCOUNT_A, 15.0, None).await?;
    assert_eq!(result.withdrawal.balance, 5.0);
    assert_eq!(result.deposit.balance, 25.0);

    // A checks the balance in yen
    let yen = service.get_balance_in(ACCOUNT_A, Some("yen")).await?;
    assert_close(yen, 25.0 * 109.47);

    // A withdraws 20 dollars worth of yuan
    let a = service.withdraw(ACCOUNT_A, 20.0 * 6.46, Some("yuan")).await?;
    assert_close(a.balance, 5.0);
    Ok(())
}
