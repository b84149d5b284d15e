//! Error taxonomy of the DEX subsystem.
//!
//! Every rejection is a distinct kind rather than a string so that the block
//! processor and the relay policy can react per kind. Nothing here retries:
//! an error always surfaces to the caller, which drops the transaction (or
//! the block, if the transaction was already included).

use thiserror::Error;

/// Failures while decoding the canonical byte stream. The transaction is
/// rejected at ingest, before any signature or state work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("byte stream ended inside a value")]
    Truncated,
    #[error("var-int has a redundant leading byte or overflows 64 bits")]
    NonCanonicalVarInt,
    #[error("encoded vector length exceeds the codec ceiling")]
    OversizeVec,
    #[error("unknown enum discriminant on the wire")]
    UnknownEnum,
    #[error("string payload is not valid UTF-8")]
    BadString,
    #[error("bytes left over after the final field")]
    TrailingBytes,
}

/// Static validation failures of an order-placing transaction. Rejected before
/// execution; the relay policy may ban the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidOrderReason {
    #[error("coin or asset symbol is not whitelisted for this side")]
    UnknownSymbol,
    #[error("coin and asset symbol are identical")]
    SameSymbol,
    #[error("order amount is zero or above the per-symbol maximum")]
    AmountOutOfRange,
    #[error("limit price is outside the registry window for the pair")]
    PriceOutOfRange,
    #[error("no operator is registered under the order dex id")]
    UnknownDexOperator,
    #[error("operator fee ratio is above the allowed ceiling")]
    FeeRatioOutOfRange,
    #[error("order requires operator authorization but carries none")]
    MissingOperatorAuth,
    #[error("operator signature does not verify or names the wrong account")]
    BadOperatorSignature,
    #[error("default-mode order carries a non-zero operator fee ratio")]
    ModeFeeMismatch,
}

/// Execution-time rejections. The transaction is dropped but the block can
/// continue with the remaining transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("available balance is below the required amount")]
    InsufficientBalance,
    #[error("transaction signature does not match the account key")]
    BadSignature,
    #[error("transaction conflicts with current state")]
    StateConflict,
    #[error("transaction fails stateless format validation")]
    Malformed,
}

/// Settlement rejections. A settle transaction is all-or-nothing: the first
/// failing deal item (index attached) rejects the whole transaction with no
/// partial effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettleError {
    #[error("deal item {0}: order not found in the active index")]
    OrderNotFound(usize),
    #[error("deal item {0}: orders do not belong to the settling dex")]
    DexMismatch(usize),
    #[error("deal item {0}: order sides are not one buy and one sell")]
    BadSide(usize),
    #[error("deal item {0}: coin/asset symbols differ between the orders")]
    SymbolMismatch(usize),
    #[error("deal item {0}: deal price is outside the orders' price bounds")]
    PriceInfeasible(usize),
    #[error("deal item {0}: deal coin amount does not match price * asset")]
    FillIncoherent(usize),
    #[error("deal item {0}: deal exceeds an order's remaining capacity")]
    OverFill(usize),
    #[error("deal item {0}: both orders are market orders")]
    BothMarket(usize),
    #[error("settle submitter is not the matcher of this dex")]
    UnauthorizedMatcher,
}

/// Union error surfaced by the runtime dispatcher to the block processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DexError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    InvalidOrder(#[from] InvalidOrderReason),
    #[error(transparent)]
    Tx(#[from] TxError),
    #[error(transparent)]
    Settle(#[from] SettleError),
}
