use dex_state::{CancelOrder, DexState, OpSuccess, PlaceOrder, SettleOrders, TxHandler};
use dex_types::params::RESERVED_DEX_ID;
use dex_types::{
    Decode, DexError, DexTx, InvalidOrderReason, OperatorMode, OperatorParams, TxError,
};
use dex_basic_types::{RegId, TxCord};

/// Block-pipeline front of the DEX subsystem.
///
/// Owns the per-block transaction cursor and drives every transaction through
/// the same gauntlet: decode, stateless format checks, signature
/// verification, operator authorization, then dispatch to the state handler.
/// Processing is strictly sequential; a transaction later in the block sees
/// everything an earlier one wrote.
#[derive(Debug, Clone)]
pub struct DexExecutor {
    state: DexState,
    cursor: TxCord,
}

impl DexExecutor {
    pub fn new(state: DexState) -> Self {
        Self {
            state,
            cursor: TxCord::EMPTY,
        }
    }

    pub fn state(&self) -> &DexState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DexState {
        &mut self.state
    }

    /// Opens a block: subsequent transactions are assigned cords
    /// `(height, 0), (height, 1), ...` in acceptance order.
    pub fn begin_block(&mut self, height: u32) {
        self.cursor = TxCord::new(height, 0);
    }

    /// Decodes and applies a raw transaction blob.
    pub fn apply_raw(&mut self, bytes: &[u8]) -> Result<OpSuccess, DexError> {
        let tx = DexTx::decode_all(bytes)?;
        self.apply_tx(tx)
    }

    /// Applies a decoded transaction. A rejected transaction consumes no
    /// cord and leaves the state untouched.
    pub fn apply_tx(&mut self, tx: DexTx) -> Result<OpSuccess, DexError> {
        if !tx.check_correctness() {
            return Err(TxError::Malformed.into());
        }
        self.verify_user_signature(&tx)?;
        if let Some(operator) = tx.operator_params() {
            self.verify_operator_authorization(&tx, operator)?;
        }

        let success = self.dispatch(tx)?;
        self.cursor.index += 1;
        Ok(success)
    }

    fn dispatch(&mut self, tx: DexTx) -> Result<OpSuccess, DexError> {
        match &tx {
            DexTx::CancelOrder(cancel) => self.state.apply_tx(CancelOrder {
                order_id: cancel.order_id,
                by: cancel.tx_uid,
            }),
            DexTx::Settle(settle) => self.state.apply_tx(SettleOrders {
                dex_id: RESERVED_DEX_ID,
                submitter: settle.tx_uid,
                deal_items: settle.deal_items.clone(),
            }),
            DexTx::SettleEx(settle) => self.state.apply_tx(SettleOrders {
                dex_id: settle.dex_id,
                submitter: settle.settle.tx_uid,
                deal_items: settle.settle.deal_items.clone(),
            }),
            _ => {
                let mut order = tx
                    .to_order_detail()
                    .expect("remaining variants place orders")?;
                order.tx_cord = self.cursor;
                self.state.apply_tx(PlaceOrder {
                    order,
                    order_id: tx.hash(),
                })
            }
        }
    }

    fn verify_user_signature(&self, tx: &DexTx) -> Result<(), DexError> {
        let account = self
            .state
            .get_account(tx.tx_uid())
            .ok_or(TxError::BadSignature)?;
        let digest = tx.signature_digest();
        if !tx.signature().verify(&digest, &account.pub_key) {
            tracing::warn!(uid = %tx.tx_uid(), "dex tx signature mismatch");
            return Err(TxError::BadSignature.into());
        }
        Ok(())
    }

    /// Authorization checks of the authenticated operator model. The fee
    /// policy itself (ratio ceilings, mode/fee coherence) is re-checked by
    /// the state gauntlet; this is only about who signed.
    fn verify_operator_authorization(
        &self,
        tx: &DexTx,
        operator: &OperatorParams,
    ) -> Result<(), DexError> {
        if operator.mode != OperatorMode::RequireAuth {
            return Ok(());
        }
        let pair = tx
            .operator_signature()
            .ok_or(InvalidOrderReason::MissingOperatorAuth)?;
        let record = self
            .state
            .get_operator(operator.dex_id)
            .ok_or(InvalidOrderReason::UnknownDexOperator)?;

        // The co-signer must be the account the user committed to, and that
        // account must actually run this dex.
        if pair.regid != operator.operator_regid
            || !authorized_operator_account(pair.regid, &record)
        {
            return Err(InvalidOrderReason::BadOperatorSignature.into());
        }
        let signer = self
            .state
            .get_account(pair.regid)
            .ok_or(InvalidOrderReason::BadOperatorSignature)?;
        let digest = tx.signature_digest();
        if !pair.signature.verify(&digest, &signer.pub_key) {
            return Err(InvalidOrderReason::BadOperatorSignature.into());
        }
        Ok(())
    }
}

fn authorized_operator_account(regid: RegId, record: &dex_types::DexOperator) -> bool {
    regid == record.owner_regid || regid == record.match_regid
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_types::params::{RISK_RESERVE_REGID, SYS_MATCHER_REGID};
    use dex_types::tx::{keypair_from_seed, KeyPair};
    use dex_types::{
        Account, AccountPubKey, AssetInfo, CancelOrderTx, DealItem, DexOperator, Encode,
        LimitOrderExTx, LimitOrderTx, OperatorParams, SettleTx,
    };
    use dex_basic_types::{DexId, TokenSymbol};

    const BUYER: RegId = RegId {
        height: 10,
        index: 1,
    };
    const SELLER: RegId = RegId {
        height: 11,
        index: 1,
    };

    fn wusd() -> TokenSymbol {
        "WUSD".into()
    }

    fn wicc() -> TokenSymbol {
        "WICC".into()
    }

    fn keyed_account(executor: &mut DexExecutor, regid: RegId, seed: &[u8]) -> KeyPair {
        let keypair = keypair_from_seed(seed).unwrap();
        let account = Account::with_key(regid, AccountPubKey::from_public(keypair.public()));
        executor.state_mut().insert_account(regid, account);
        keypair
    }

    fn fund(executor: &mut DexExecutor, regid: RegId, symbol: &TokenSymbol, amount: u64) {
        let mut account = executor.state().get_account(regid).unwrap();
        account.add_available(symbol, amount).unwrap();
        executor.state_mut().insert_account(regid, account);
    }

    fn test_executor() -> DexExecutor {
        let mut state = DexState::empty();
        state.register_asset(AssetInfo::coin_only("WUSD"));
        state.register_asset(AssetInfo::new("WICC"));
        let mut executor = DexExecutor::new(state);
        executor.begin_block(7);
        executor
    }

    fn buy_limit_body(uid: RegId) -> LimitOrderTx {
        LimitOrderTx::new(
            100,
            uid,
            "WICC".into(),
            10_000,
            "WUSD".into(),
            "WICC".into(),
            500_000_000,
            1_000_000_000,
        )
    }

    #[test]
    fn raw_blobs_flow_through_decode_verify_and_settle_in_one_block() {
        let mut executor = test_executor();
        let buyer_key = keyed_account(&mut executor, BUYER, b"buyer");
        let seller_key = keyed_account(&mut executor, SELLER, b"seller");
        let matcher_key = keyed_account(&mut executor, SYS_MATCHER_REGID, b"matcher");
        fund(&mut executor, BUYER, &wusd(), 5_000_000_000);
        fund(&mut executor, SELLER, &wicc(), 500_000_000);

        let mut buy = DexTx::buy_limit(buy_limit_body(BUYER));
        buy.sign_user(buyer_key.secret()).unwrap();
        let buy_id = buy.hash();
        executor.apply_raw(&buy.encoded()).unwrap();

        let mut sell = DexTx::sell_limit(LimitOrderTx::new(
            100,
            SELLER,
            "WICC".into(),
            10_000,
            "WUSD".into(),
            "WICC".into(),
            500_000_000,
            900_000_000,
        ));
        sell.sign_user(seller_key.secret()).unwrap();
        let sell_id = sell.hash();
        executor.apply_raw(&sell.encoded()).unwrap();

        // Cords follow acceptance order within the block.
        assert_eq!(
            executor.state().get_active_order(&buy_id).unwrap().tx_cord,
            TxCord::new(7, 0)
        );
        assert_eq!(
            executor.state().get_active_order(&sell_id).unwrap().tx_cord,
            TxCord::new(7, 1)
        );

        // A settle later in the same block sees both placements.
        let mut settle = DexTx::from(SettleTx::new(
            100,
            SYS_MATCHER_REGID,
            "WICC".into(),
            10_000,
            vec![DealItem {
                buy_order_id: buy_id,
                sell_order_id: sell_id,
                deal_price: 1_000_000_000,
                deal_coin_amount: 5_000_000_000,
                deal_asset_amount: 500_000_000,
            }],
        ));
        settle.sign_user(matcher_key.secret()).unwrap();
        executor.apply_raw(&settle.encoded()).unwrap();

        let buyer = executor.state().get_account(BUYER).unwrap();
        assert_eq!(buyer.get_balance(&wusd()).frozen, 0);
        assert_eq!(buyer.get_balance(&wicc()).available, 500_000_000 - 200_000);
        let seller = executor.state().get_account(SELLER).unwrap();
        assert_eq!(
            seller.get_balance(&wusd()).available,
            5_000_000_000 - 4_000_000
        );
        let reserve = executor.state().get_account(RISK_RESERVE_REGID).unwrap();
        assert_eq!(reserve.get_balance(&wusd()).available, 4_000_000);
        assert!(executor.state().get_active_order(&buy_id).is_none());
        assert!(executor.state().get_active_order(&sell_id).is_none());
    }

    #[test]
    fn user_signature_must_match_the_account_key() {
        let mut executor = test_executor();
        keyed_account(&mut executor, BUYER, b"buyer");
        fund(&mut executor, BUYER, &wusd(), 5_000_000_000);

        let stranger = keypair_from_seed(b"stranger").unwrap();
        let mut buy = DexTx::buy_limit(buy_limit_body(BUYER));
        buy.sign_user(stranger.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&buy.encoded()).unwrap_err(),
            DexError::Tx(TxError::BadSignature)
        );

        // Unsigned transactions fail the same way.
        let unsigned = DexTx::buy_limit(buy_limit_body(BUYER));
        assert_eq!(
            executor.apply_raw(&unsigned.encoded()).unwrap_err(),
            DexError::Tx(TxError::BadSignature)
        );

        // Nothing was placed and no cord was consumed.
        assert_eq!(executor.state().active_orders().count(), 0);
        assert_eq!(executor.cursor, TxCord::new(7, 0));
    }

    const DEX: DexId = DexId(3);
    const OWNER: RegId = RegId {
        height: 50,
        index: 1,
    };
    const MATCHER: RegId = RegId {
        height: 50,
        index: 2,
    };

    fn register_operator(executor: &mut DexExecutor) {
        executor.state_mut().register_operator(
            DEX,
            DexOperator {
                owner_regid: OWNER,
                match_regid: MATCHER,
                name: "test-dex".to_owned(),
                portal_url: String::new(),
                maker_fee_ratio: 200_000,
                taker_fee_ratio: 300_000,
                memo: String::new(),
            },
        );
    }

    fn auth_buy_limit(uid: RegId) -> DexTx {
        DexTx::buy_limit_ex(LimitOrderExTx {
            order: buy_limit_body(uid),
            operator: OperatorParams::require_auth(DEX, OWNER, 400_000, String::new()),
        })
    }

    #[test]
    fn authenticated_mode_requires_a_valid_operator_cosignature() {
        let mut executor = test_executor();
        register_operator(&mut executor);
        let buyer_key = keyed_account(&mut executor, BUYER, b"buyer");
        keyed_account(&mut executor, OWNER, b"owner");
        fund(&mut executor, BUYER, &wusd(), 5_000_000_000);

        // No co-signature at all.
        let mut bare = auth_buy_limit(BUYER);
        bare.sign_user(buyer_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&bare.encoded()).unwrap_err(),
            DexError::InvalidOrder(InvalidOrderReason::MissingOperatorAuth)
        );

        // Co-signed by a key that is not the operator account's.
        let mut forged = auth_buy_limit(BUYER);
        let stranger = keypair_from_seed(b"stranger").unwrap();
        forged.sign_operator(OWNER, stranger.secret()).unwrap();
        forged.sign_user(buyer_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&forged.encoded()).unwrap_err(),
            DexError::InvalidOrder(InvalidOrderReason::BadOperatorSignature)
        );

        // A pair naming an account that does not run this dex.
        let mut misnamed = auth_buy_limit(BUYER);
        let buyer_as_operator = keypair_from_seed(b"buyer").unwrap();
        misnamed
            .sign_operator(BUYER, buyer_as_operator.secret())
            .unwrap();
        misnamed.sign_user(buyer_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&misnamed.encoded()).unwrap_err(),
            DexError::InvalidOrder(InvalidOrderReason::BadOperatorSignature)
        );

        // Properly co-signed by the operator owner.
        let owner_key = keypair_from_seed(b"owner").unwrap();
        let mut good = auth_buy_limit(BUYER);
        good.sign_operator(OWNER, owner_key.secret()).unwrap();
        good.sign_user(buyer_key.secret()).unwrap();
        executor.apply_raw(&good.encoded()).unwrap();
        assert_eq!(executor.state().active_orders().count(), 1);
    }

    #[test]
    fn format_failures_are_rejected_before_any_state_read() {
        let mut executor = test_executor();
        let buyer_key = keyed_account(&mut executor, BUYER, b"buyer");
        fund(&mut executor, BUYER, &wusd(), 5_000_000_000);

        let mut body = buy_limit_body(BUYER);
        body.version = 2;
        let mut tx = DexTx::buy_limit(body);
        tx.sign_user(buyer_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&tx.encoded()).unwrap_err(),
            DexError::Tx(TxError::Malformed)
        );
    }

    #[test]
    fn cancel_round_trips_through_the_pipeline() {
        let mut executor = test_executor();
        let buyer_key = keyed_account(&mut executor, BUYER, b"buyer");
        let seller_key = keyed_account(&mut executor, SELLER, b"seller");
        fund(&mut executor, BUYER, &wusd(), 5_000_000_000);

        let mut buy = DexTx::buy_limit(buy_limit_body(BUYER));
        buy.sign_user(buyer_key.secret()).unwrap();
        let buy_id = buy.hash();
        executor.apply_raw(&buy.encoded()).unwrap();

        // Someone else's cancel is refused.
        let mut theft = DexTx::from(CancelOrderTx::new(
            100,
            SELLER,
            "WICC".into(),
            10_000,
            buy_id,
        ));
        theft.sign_user(seller_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&theft.encoded()).unwrap_err(),
            DexError::Tx(TxError::StateConflict)
        );

        let mut cancel = DexTx::from(CancelOrderTx::new(
            100,
            BUYER,
            "WICC".into(),
            10_000,
            buy_id,
        ));
        cancel.sign_user(buyer_key.secret()).unwrap();
        executor.apply_raw(&cancel.encoded()).unwrap();

        let buyer = executor.state().get_account(BUYER).unwrap();
        assert_eq!(buyer.get_balance(&wusd()).available, 5_000_000_000);
        assert_eq!(buyer.get_balance(&wusd()).frozen, 0);
        assert!(executor.state().get_active_order(&buy_id).is_none());

        // Cancelling a retired order conflicts.
        let mut again = DexTx::from(CancelOrderTx::new(
            101,
            BUYER,
            "WICC".into(),
            10_000,
            buy_id,
        ));
        again.sign_user(buyer_key.secret()).unwrap();
        assert_eq!(
            executor.apply_raw(&again.encoded()).unwrap_err(),
            DexError::Tx(TxError::StateConflict)
        );
    }
}
