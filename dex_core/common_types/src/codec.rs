//! Canonical binary codec of every DEX entity and transaction.
//!
//! The byte layout in this file is consensus: two nodes that disagree on a
//! single byte here fork the chain. Every implementation is written out
//! mechanically in one place so the complete wire format can be audited
//! top-to-bottom, and the frozen fixtures at the bottom pin it forever.
//!
//! Primitives:
//! - small enums are a single byte;
//! - unsigned integers are canonical base-128 big-endian var-ints with the
//!   high bit as continuation marker on all bytes but the last;
//! - strings are a var-int length followed by raw UTF-8 bytes;
//! - vectors are a var-int count followed by the elements;
//! - options are a one-byte presence flag;
//! - `RegId` is its fixed 6-byte form, `TxId` its raw 32 bytes.

use std::convert::TryFrom;

use crate::error::CodecError;
use crate::order::{ActiveOrder, OperatorMode, OrderDetail, OrderGenerateType, OrderSide, OrderType};
use crate::operator::DexOperator;
use crate::params::MAX_VEC_LEN;
use crate::tx::{
    CancelOrderTx, DealItem, DexTx, DexTxType, LimitOrderExTx, LimitOrderTx, MarketBuyOrderExTx,
    MarketBuyOrderTx, MarketSellOrderExTx, MarketSellOrderTx, OperatorParams, SettleExTx, SettleTx,
    SignaturePair, TxSignature,
};
use dex_basic_types::{BlockHeight, DexId, RegId, TokenSymbol, TxCord, TxId};

/// Cursor over an immutable byte stream being decoded.
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    pub fn read_byte(&mut self) -> Result<u8, CodecError> {
        let byte = *self.bytes.get(self.pos).ok_or(CodecError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(len).ok_or(CodecError::Truncated)?;
        if end > self.bytes.len() {
            return Err(CodecError::Truncated);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Canonical var-int. A redundant leading `0x80` byte and anything that
    /// does not fit 64 bits are rejected, so every integer has exactly one
    /// byte representation.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let mut value: u64 = 0;
        let mut first = true;
        loop {
            let byte = self.read_byte()?;
            if first && byte == 0x80 {
                return Err(CodecError::NonCanonicalVarInt);
            }
            first = false;
            if value > (u64::MAX >> 7) {
                return Err(CodecError::NonCanonicalVarInt);
            }
            value = (value << 7) | u64::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    fn read_varint_u32(&mut self) -> Result<u32, CodecError> {
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| CodecError::NonCanonicalVarInt)
    }

    fn read_varint_u16(&mut self) -> Result<u16, CodecError> {
        let value = self.read_varint()?;
        u16::try_from(value).map_err(|_| CodecError::NonCanonicalVarInt)
    }
}

pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    let mut septets = [0u8; 10];
    let mut count = 0;
    loop {
        septets[count] = (value & 0x7f) as u8;
        value >>= 7;
        count += 1;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(septets[i] | continuation);
    }
}

pub trait Encode {
    fn encode(&self, out: &mut Vec<u8>);

    fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

pub trait Decode: Sized {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Decodes a complete value, rejecting any bytes past its end.
    fn decode_all(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        let value = Self::decode(&mut reader)?;
        if !reader.is_at_end() {
            return Err(CodecError::TrailingBytes);
        }
        Ok(value)
    }
}

impl Encode for String {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.len() as u64);
        out.extend_from_slice(self.as_bytes());
    }
}

impl Decode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = reader.read_varint()?;
        if len > MAX_VEC_LEN {
            return Err(CodecError::OversizeVec);
        }
        let bytes = reader.read_exact(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::BadString)
    }
}

impl Encode for TokenSymbol {
    fn encode(&self, out: &mut Vec<u8>) {
        self.0.encode(out);
    }
}

impl Decode for TokenSymbol {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(TokenSymbol(String::decode(reader)?))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.len() as u64);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let count = reader.read_varint()?;
        if count > MAX_VEC_LEN {
            return Err(CodecError::OversizeVec);
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(T::decode(reader)?);
        }
        Ok(items)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            None => out.push(0),
            Some(value) => {
                out.push(1);
                value.encode(out);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_byte()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(reader)?)),
            _ => Err(CodecError::UnknownEnum),
        }
    }
}

impl Encode for RegId {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

impl Decode for RegId {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut raw = [0u8; RegId::BYTES];
        raw.copy_from_slice(reader.read_exact(RegId::BYTES)?);
        Ok(RegId::from_bytes(raw))
    }
}

impl Encode for TxId {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Decode for TxId {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut raw = [0u8; TxId::BYTES];
        raw.copy_from_slice(reader.read_exact(TxId::BYTES)?);
        Ok(TxId(raw))
    }
}

impl Encode for TxCord {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, u64::from(*self.height));
        write_varint(out, u64::from(self.index));
    }
}

impl Decode for TxCord {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let height = reader.read_varint_u32()?;
        let index = reader.read_varint_u16()?;
        Ok(TxCord {
            height: BlockHeight(height),
            index,
        })
    }
}

impl Encode for OrderSide {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl Decode for OrderSide {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_byte()? {
            1 => Ok(OrderSide::Buy),
            2 => Ok(OrderSide::Sell),
            _ => Err(CodecError::UnknownEnum),
        }
    }
}

impl Encode for OrderType {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl Decode for OrderType {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_byte()? {
            1 => Ok(OrderType::LimitPrice),
            2 => Ok(OrderType::MarketPrice),
            _ => Err(CodecError::UnknownEnum),
        }
    }
}

impl Encode for OrderGenerateType {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl Decode for OrderGenerateType {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_byte()? {
            0 => Ok(OrderGenerateType::Empty),
            1 => Ok(OrderGenerateType::UserGen),
            2 => Ok(OrderGenerateType::SystemGen),
            _ => Err(CodecError::UnknownEnum),
        }
    }
}

impl Encode for OperatorMode {
    // Historically documented as a var-int, but for the values 0 and 1 the
    // encodings coincide: this slot is a plain byte.
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl Decode for OperatorMode {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_byte()? {
            0 => Ok(OperatorMode::Default),
            1 => Ok(OperatorMode::RequireAuth),
            _ => Err(CodecError::UnknownEnum),
        }
    }
}

impl Encode for TxSignature {
    fn encode(&self, out: &mut Vec<u8>) {
        write_varint(out, self.0.len() as u64);
        out.extend_from_slice(&self.0);
    }
}

impl Decode for TxSignature {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = reader.read_varint()?;
        if len > MAX_VEC_LEN {
            return Err(CodecError::OversizeVec);
        }
        Ok(TxSignature(reader.read_exact(len as usize)?.to_vec()))
    }
}

impl Encode for SignaturePair {
    fn encode(&self, out: &mut Vec<u8>) {
        self.regid.encode(out);
        self.signature.encode(out);
    }
}

impl Decode for SignaturePair {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(SignaturePair {
            regid: RegId::decode(reader)?,
            signature: TxSignature::decode(reader)?,
        })
    }
}

impl Encode for OrderDetail {
    fn encode(&self, out: &mut Vec<u8>) {
        self.mode.encode(out);
        write_varint(out, u64::from(*self.dex_id));
        write_varint(out, self.operator_fee_ratio);
        self.generate_type.encode(out);
        self.order_type.encode(out);
        self.order_side.encode(out);
        self.coin_symbol.encode(out);
        self.asset_symbol.encode(out);
        write_varint(out, self.coin_amount);
        write_varint(out, self.asset_amount);
        write_varint(out, self.price);
        self.tx_cord.encode(out);
        self.user_regid.encode(out);
        write_varint(out, self.total_deal_coin_amount);
        write_varint(out, self.total_deal_asset_amount);
        // The cord is written a second time at the tail. Redundant, but
        // stored orders already hash this layout, so it stays.
        // TODO: drop the duplicate at the next codec version bump.
        self.tx_cord.encode(out);
    }
}

impl Decode for OrderDetail {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mode = OperatorMode::decode(reader)?;
        let dex_id = DexId(reader.read_varint_u32()?);
        let operator_fee_ratio = reader.read_varint()?;
        let generate_type = OrderGenerateType::decode(reader)?;
        let order_type = OrderType::decode(reader)?;
        let order_side = OrderSide::decode(reader)?;
        let coin_symbol = TokenSymbol::decode(reader)?;
        let asset_symbol = TokenSymbol::decode(reader)?;
        let coin_amount = reader.read_varint()?;
        let asset_amount = reader.read_varint()?;
        let price = reader.read_varint()?;
        let _mid_cord = TxCord::decode(reader)?;
        let user_regid = RegId::decode(reader)?;
        let total_deal_coin_amount = reader.read_varint()?;
        let total_deal_asset_amount = reader.read_varint()?;
        // The trailing copy wins, as a field written twice and read twice
        // always has.
        let tx_cord = TxCord::decode(reader)?;
        Ok(OrderDetail {
            mode,
            dex_id,
            operator_fee_ratio,
            generate_type,
            order_type,
            order_side,
            coin_symbol,
            asset_symbol,
            coin_amount,
            asset_amount,
            price,
            tx_cord,
            user_regid,
            total_deal_coin_amount,
            total_deal_asset_amount,
        })
    }
}

impl Encode for ActiveOrder {
    fn encode(&self, out: &mut Vec<u8>) {
        self.generate_type.encode(out);
        self.tx_cord.encode(out);
        write_varint(out, self.total_deal_coin_amount);
        write_varint(out, self.total_deal_asset_amount);
    }
}

impl Decode for ActiveOrder {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(ActiveOrder {
            generate_type: OrderGenerateType::decode(reader)?,
            tx_cord: TxCord::decode(reader)?,
            total_deal_coin_amount: reader.read_varint()?,
            total_deal_asset_amount: reader.read_varint()?,
        })
    }
}

impl Encode for DexOperator {
    fn encode(&self, out: &mut Vec<u8>) {
        self.owner_regid.encode(out);
        self.match_regid.encode(out);
        self.name.encode(out);
        self.portal_url.encode(out);
        write_varint(out, self.maker_fee_ratio);
        write_varint(out, self.taker_fee_ratio);
        self.memo.encode(out);
    }
}

impl Decode for DexOperator {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(DexOperator {
            owner_regid: RegId::decode(reader)?,
            match_regid: RegId::decode(reader)?,
            name: String::decode(reader)?,
            portal_url: String::decode(reader)?,
            maker_fee_ratio: reader.read_varint()?,
            taker_fee_ratio: reader.read_varint()?,
            memo: String::decode(reader)?,
        })
    }
}

impl Encode for DealItem {
    fn encode(&self, out: &mut Vec<u8>) {
        self.buy_order_id.encode(out);
        self.sell_order_id.encode(out);
        write_varint(out, self.deal_price);
        write_varint(out, self.deal_coin_amount);
        write_varint(out, self.deal_asset_amount);
    }
}

impl Decode for DealItem {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(DealItem {
            buy_order_id: TxId::decode(reader)?,
            sell_order_id: TxId::decode(reader)?,
            deal_price: reader.read_varint()?,
            deal_coin_amount: reader.read_varint()?,
            deal_asset_amount: reader.read_varint()?,
        })
    }
}

// Transaction wire forms. Layout per variant, after the leading type tag:
// the common prefix (version, valid height, tx uid, fee symbol, fees), the
// variant's own fields in signature order, then for extended forms the
// optional operator signature pair, then the user signature.

struct TxPrefix {
    version: u32,
    valid_height: u32,
    tx_uid: RegId,
    fee_symbol: TokenSymbol,
    fees: u64,
}

fn encode_prefix(
    out: &mut Vec<u8>,
    version: u32,
    valid_height: u32,
    tx_uid: RegId,
    fee_symbol: &TokenSymbol,
    fees: u64,
) {
    write_varint(out, u64::from(version));
    write_varint(out, u64::from(valid_height));
    tx_uid.encode(out);
    fee_symbol.encode(out);
    write_varint(out, fees);
}

fn decode_prefix(reader: &mut Reader<'_>) -> Result<TxPrefix, CodecError> {
    Ok(TxPrefix {
        version: reader.read_varint_u32()?,
        valid_height: reader.read_varint_u32()?,
        tx_uid: RegId::decode(reader)?,
        fee_symbol: TokenSymbol::decode(reader)?,
        fees: reader.read_varint()?,
    })
}

fn encode_operator_head(out: &mut Vec<u8>, operator: &OperatorParams) {
    operator.mode.encode(out);
    write_varint(out, u64::from(*operator.dex_id));
    write_varint(out, operator.operator_fee_ratio);
}

fn encode_operator_tail(out: &mut Vec<u8>, operator: &OperatorParams) {
    operator.memo.encode(out);
    operator.operator_regid.encode(out);
    operator.operator_signature.encode(out);
}

struct OperatorHead {
    mode: OperatorMode,
    dex_id: DexId,
    operator_fee_ratio: u64,
}

fn decode_operator_head(reader: &mut Reader<'_>) -> Result<OperatorHead, CodecError> {
    Ok(OperatorHead {
        mode: OperatorMode::decode(reader)?,
        dex_id: DexId(reader.read_varint_u32()?),
        operator_fee_ratio: reader.read_varint()?,
    })
}

fn decode_operator_tail(
    reader: &mut Reader<'_>,
    head: OperatorHead,
) -> Result<OperatorParams, CodecError> {
    Ok(OperatorParams {
        mode: head.mode,
        dex_id: head.dex_id,
        operator_fee_ratio: head.operator_fee_ratio,
        memo: String::decode(reader)?,
        operator_regid: RegId::decode(reader)?,
        operator_signature: Option::<SignaturePair>::decode(reader)?,
    })
}

impl Encode for DexTx {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.tx_type().as_byte());
        match self {
            DexTx::BuyLimitOrder(tx) | DexTx::SellLimitOrder(tx) => {
                encode_prefix(out, tx.version, tx.valid_height, tx.tx_uid, &tx.fee_symbol, tx.fees);
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.asset_amount);
                write_varint(out, tx.price);
                tx.signature.encode(out);
            }
            DexTx::BuyMarketOrder(tx) => {
                encode_prefix(out, tx.version, tx.valid_height, tx.tx_uid, &tx.fee_symbol, tx.fees);
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.coin_amount);
                tx.signature.encode(out);
            }
            DexTx::SellMarketOrder(tx) => {
                encode_prefix(out, tx.version, tx.valid_height, tx.tx_uid, &tx.fee_symbol, tx.fees);
                tx.coin_symbol.encode(out);
                tx.asset_symbol.encode(out);
                write_varint(out, tx.asset_amount);
                tx.signature.encode(out);
            }
            DexTx::BuyLimitOrderEx(tx) | DexTx::SellLimitOrderEx(tx) => {
                let order = &tx.order;
                encode_prefix(
                    out,
                    order.version,
                    order.valid_height,
                    order.tx_uid,
                    &order.fee_symbol,
                    order.fees,
                );
                encode_operator_head(out, &tx.operator);
                order.coin_symbol.encode(out);
                order.asset_symbol.encode(out);
                write_varint(out, order.asset_amount);
                write_varint(out, order.price);
                encode_operator_tail(out, &tx.operator);
                order.signature.encode(out);
            }
            DexTx::BuyMarketOrderEx(tx) => {
                let order = &tx.order;
                encode_prefix(
                    out,
                    order.version,
                    order.valid_height,
                    order.tx_uid,
                    &order.fee_symbol,
                    order.fees,
                );
                encode_operator_head(out, &tx.operator);
                order.coin_symbol.encode(out);
                order.asset_symbol.encode(out);
                write_varint(out, order.coin_amount);
                encode_operator_tail(out, &tx.operator);
                order.signature.encode(out);
            }
            DexTx::SellMarketOrderEx(tx) => {
                let order = &tx.order;
                encode_prefix(
                    out,
                    order.version,
                    order.valid_height,
                    order.tx_uid,
                    &order.fee_symbol,
                    order.fees,
                );
                encode_operator_head(out, &tx.operator);
                order.coin_symbol.encode(out);
                order.asset_symbol.encode(out);
                write_varint(out, order.asset_amount);
                encode_operator_tail(out, &tx.operator);
                order.signature.encode(out);
            }
            DexTx::CancelOrder(tx) => {
                encode_prefix(out, tx.version, tx.valid_height, tx.tx_uid, &tx.fee_symbol, tx.fees);
                tx.order_id.encode(out);
                tx.signature.encode(out);
            }
            DexTx::Settle(tx) => {
                encode_prefix(out, tx.version, tx.valid_height, tx.tx_uid, &tx.fee_symbol, tx.fees);
                tx.deal_items.encode(out);
                tx.signature.encode(out);
            }
            DexTx::SettleEx(tx) => {
                let settle = &tx.settle;
                encode_prefix(
                    out,
                    settle.version,
                    settle.valid_height,
                    settle.tx_uid,
                    &settle.fee_symbol,
                    settle.fees,
                );
                write_varint(out, u64::from(*tx.dex_id));
                settle.deal_items.encode(out);
                tx.memo.encode(out);
                tx.operator_signature.encode(out);
                settle.signature.encode(out);
            }
        }
    }
}

impl Decode for DexTx {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tx_type = DexTxType::from_byte(reader.read_byte()?).ok_or(CodecError::UnknownEnum)?;
        let prefix = decode_prefix(reader)?;
        let tx = match tx_type {
            DexTxType::LimitBuyOrder | DexTxType::LimitSellOrder => {
                let tx = decode_limit_body(reader, prefix)?;
                if tx_type == DexTxType::LimitBuyOrder {
                    DexTx::buy_limit(tx)
                } else {
                    DexTx::sell_limit(tx)
                }
            }
            DexTxType::MarketBuyOrder => {
                let coin_symbol = TokenSymbol::decode(reader)?;
                let asset_symbol = TokenSymbol::decode(reader)?;
                let coin_amount = reader.read_varint()?;
                let signature = TxSignature::decode(reader)?;
                DexTx::buy_market(MarketBuyOrderTx {
                    version: prefix.version,
                    valid_height: prefix.valid_height,
                    tx_uid: prefix.tx_uid,
                    fee_symbol: prefix.fee_symbol,
                    fees: prefix.fees,
                    coin_symbol,
                    asset_symbol,
                    coin_amount,
                    signature,
                })
            }
            DexTxType::MarketSellOrder => {
                let coin_symbol = TokenSymbol::decode(reader)?;
                let asset_symbol = TokenSymbol::decode(reader)?;
                let asset_amount = reader.read_varint()?;
                let signature = TxSignature::decode(reader)?;
                DexTx::sell_market(MarketSellOrderTx {
                    version: prefix.version,
                    valid_height: prefix.valid_height,
                    tx_uid: prefix.tx_uid,
                    fee_symbol: prefix.fee_symbol,
                    fees: prefix.fees,
                    coin_symbol,
                    asset_symbol,
                    asset_amount,
                    signature,
                })
            }
            DexTxType::LimitBuyOrderEx | DexTxType::LimitSellOrderEx => {
                let head = decode_operator_head(reader)?;
                let coin_symbol = TokenSymbol::decode(reader)?;
                let asset_symbol = TokenSymbol::decode(reader)?;
                let asset_amount = reader.read_varint()?;
                let price = reader.read_varint()?;
                let operator = decode_operator_tail(reader, head)?;
                let signature = TxSignature::decode(reader)?;
                let tx = LimitOrderExTx {
                    order: LimitOrderTx {
                        version: prefix.version,
                        valid_height: prefix.valid_height,
                        tx_uid: prefix.tx_uid,
                        fee_symbol: prefix.fee_symbol,
                        fees: prefix.fees,
                        coin_symbol,
                        asset_symbol,
                        asset_amount,
                        price,
                        signature,
                    },
                    operator,
                };
                if tx_type == DexTxType::LimitBuyOrderEx {
                    DexTx::buy_limit_ex(tx)
                } else {
                    DexTx::sell_limit_ex(tx)
                }
            }
            DexTxType::MarketBuyOrderEx => {
                let head = decode_operator_head(reader)?;
                let coin_symbol = TokenSymbol::decode(reader)?;
                let asset_symbol = TokenSymbol::decode(reader)?;
                let coin_amount = reader.read_varint()?;
                let operator = decode_operator_tail(reader, head)?;
                let signature = TxSignature::decode(reader)?;
                DexTx::buy_market_ex(MarketBuyOrderExTx {
                    order: MarketBuyOrderTx {
                        version: prefix.version,
                        valid_height: prefix.valid_height,
                        tx_uid: prefix.tx_uid,
                        fee_symbol: prefix.fee_symbol,
                        fees: prefix.fees,
                        coin_symbol,
                        asset_symbol,
                        coin_amount,
                        signature,
                    },
                    operator,
                })
            }
            DexTxType::MarketSellOrderEx => {
                let head = decode_operator_head(reader)?;
                let coin_symbol = TokenSymbol::decode(reader)?;
                let asset_symbol = TokenSymbol::decode(reader)?;
                let asset_amount = reader.read_varint()?;
                let operator = decode_operator_tail(reader, head)?;
                let signature = TxSignature::decode(reader)?;
                DexTx::sell_market_ex(MarketSellOrderExTx {
                    order: MarketSellOrderTx {
                        version: prefix.version,
                        valid_height: prefix.valid_height,
                        tx_uid: prefix.tx_uid,
                        fee_symbol: prefix.fee_symbol,
                        fees: prefix.fees,
                        coin_symbol,
                        asset_symbol,
                        asset_amount,
                        signature,
                    },
                    operator,
                })
            }
            DexTxType::CancelOrder => {
                let order_id = TxId::decode(reader)?;
                let signature = TxSignature::decode(reader)?;
                DexTx::from(CancelOrderTx {
                    version: prefix.version,
                    valid_height: prefix.valid_height,
                    tx_uid: prefix.tx_uid,
                    fee_symbol: prefix.fee_symbol,
                    fees: prefix.fees,
                    order_id,
                    signature,
                })
            }
            DexTxType::TradeSettle => {
                let deal_items = Vec::<DealItem>::decode(reader)?;
                let signature = TxSignature::decode(reader)?;
                DexTx::from(SettleTx {
                    version: prefix.version,
                    valid_height: prefix.valid_height,
                    tx_uid: prefix.tx_uid,
                    fee_symbol: prefix.fee_symbol,
                    fees: prefix.fees,
                    deal_items,
                    signature,
                })
            }
            DexTxType::TradeSettleEx => {
                let dex_id = DexId(reader.read_varint_u32()?);
                let deal_items = Vec::<DealItem>::decode(reader)?;
                let memo = String::decode(reader)?;
                let operator_signature = Option::<SignaturePair>::decode(reader)?;
                let signature = TxSignature::decode(reader)?;
                DexTx::from(SettleExTx {
                    settle: SettleTx {
                        version: prefix.version,
                        valid_height: prefix.valid_height,
                        tx_uid: prefix.tx_uid,
                        fee_symbol: prefix.fee_symbol,
                        fees: prefix.fees,
                        deal_items,
                        signature,
                    },
                    dex_id,
                    memo,
                    operator_signature,
                })
            }
        };
        Ok(tx)
    }
}

fn decode_limit_body(reader: &mut Reader<'_>, prefix: TxPrefix) -> Result<LimitOrderTx, CodecError> {
    Ok(LimitOrderTx {
        version: prefix.version,
        valid_height: prefix.valid_height,
        tx_uid: prefix.tx_uid,
        fee_symbol: prefix.fee_symbol,
        fees: prefix.fees,
        coin_symbol: TokenSymbol::decode(reader)?,
        asset_symbol: TokenSymbol::decode(reader)?,
        asset_amount: reader.read_varint()?,
        price: reader.read_varint()?,
        signature: TxSignature::decode(reader)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderPair;

    fn decode_hex(hex_str: &str) -> Vec<u8> {
        hex::decode(hex_str).expect("valid fixture hex")
    }

    fn varint_bytes(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value);
        out
    }

    fn read_varint_all(bytes: &[u8]) -> Result<u64, CodecError> {
        let mut reader = Reader::new(bytes);
        let value = reader.read_varint()?;
        assert!(reader.is_at_end());
        Ok(value)
    }

    #[test]
    fn varint_boundary_encodings_are_frozen() {
        assert_eq!(varint_bytes(0), decode_hex("00"));
        assert_eq!(varint_bytes(1), decode_hex("01"));
        assert_eq!(varint_bytes(127), decode_hex("7f"));
        assert_eq!(varint_bytes(128), decode_hex("8100"));
        assert_eq!(varint_bytes(16_383), decode_hex("ff7f"));
        assert_eq!(varint_bytes(16_384), decode_hex("818000"));
        assert_eq!(varint_bytes(100_000_000), decode_hex("afd7c200"));
        assert_eq!(varint_bytes(u64::MAX), decode_hex("81ffffffffffffffff7f"));
    }

    #[test]
    fn varint_round_trip() {
        for value in [
            0u64,
            1,
            127,
            128,
            16_383,
            16_384,
            400_000,
            5_000_000_000,
            u64::MAX - 1,
            u64::MAX,
        ] {
            assert_eq!(read_varint_all(&varint_bytes(value)), Ok(value));
        }
    }

    #[test]
    fn varint_rejects_redundant_leading_byte() {
        // 0x80 0x01 would decode to 1 if the leading zero septet were allowed.
        assert_eq!(
            read_varint_all(&decode_hex("8001")),
            Err(CodecError::NonCanonicalVarInt)
        );
        assert_eq!(
            read_varint_all(&decode_hex("8080807f")),
            Err(CodecError::NonCanonicalVarInt)
        );
    }

    #[test]
    fn varint_rejects_64_bit_overflow() {
        // One septet more than u64::MAX can hold.
        assert_eq!(
            read_varint_all(&decode_hex("82ffffffffffffffffff7f")),
            Err(CodecError::NonCanonicalVarInt)
        );
    }

    #[test]
    fn varint_rejects_truncation() {
        assert_eq!(
            Reader::new(&decode_hex("81")).read_varint(),
            Err(CodecError::Truncated)
        );
    }

    fn fixture_order_detail() -> OrderDetail {
        let pair = OrderPair {
            coin_symbol: "WUSD".into(),
            asset_symbol: "WICC".into(),
        };
        let mut order =
            OrderDetail::user_buy_limit(DexId(1), pair, 1_000_000_000, 100_000_000).unwrap();
        order.mode = OperatorMode::RequireAuth;
        order.operator_fee_ratio = 400_000;
        order.tx_cord = TxCord::new(1000, 2);
        order.user_regid = RegId::new(100, 1);
        order
    }

    #[test]
    fn order_detail_layout_is_frozen() {
        let order = fixture_order_detail();
        assert_eq!(
            hex::encode(order.encoded()),
            "010198b5000101010457555344045749434383dceb940083dceb9400afd7c200\
             8768020000006400010000876802"
        );
        assert_eq!(OrderDetail::decode_all(&order.encoded()), Ok(order));
    }

    #[test]
    fn order_detail_trailing_cord_wins_on_decode() {
        // Same layout as the frozen fixture but with the two cords diverging;
        // the decoder must keep the trailing one.
        let order = fixture_order_detail();
        let mut bytes = order.encoded();
        let tail = bytes.len();
        // trailing cord is varint(1000) ++ varint(2) = 87 68 02
        bytes[tail - 3..].copy_from_slice(&decode_hex("876902"));
        let decoded = OrderDetail::decode_all(&bytes).unwrap();
        assert_eq!(decoded.tx_cord, TxCord::new(1001, 2));
    }

    #[test]
    fn active_order_layout_is_frozen() {
        let active = ActiveOrder::new(OrderGenerateType::UserGen, TxCord::new(1000, 2));
        assert_eq!(hex::encode(active.encoded()), "018768020000");
        assert_eq!(ActiveOrder::decode_all(&active.encoded()), Ok(active));
    }

    #[test]
    fn dex_operator_layout_is_frozen() {
        let operator = DexOperator {
            owner_regid: RegId::new(100, 1),
            match_regid: RegId::new(100, 2),
            name: "wayki-dex".to_owned(),
            portal_url: "https://dex.example.org".to_owned(),
            maker_fee_ratio: 40_000,
            taker_fee_ratio: 80_000,
            memo: String::new(),
        };
        assert_eq!(
            hex::encode(operator.encoded()),
            "000000640001000000640002097761796b692d6465781768747470733a2f2f64\
             65782e6578616d706c652e6f726782b84084f10000"
        );
        assert_eq!(DexOperator::decode_all(&operator.encoded()), Ok(operator));
    }

    #[test]
    fn deal_item_layout_is_frozen() {
        let item = DealItem {
            buy_order_id: TxId([0x11; 32]),
            sell_order_id: TxId([0x22; 32]),
            deal_price: 1_000_000_000,
            deal_coin_amount: 5_000_000_000,
            deal_asset_amount: 500_000_000,
        };
        assert_eq!(
            hex::encode(item.encoded()),
            "1111111111111111111111111111111111111111111111111111111111111111\
             2222222222222222222222222222222222222222222222222222222222222222\
             83dceb940092d097e40081eeb5ca00"
        );
        assert_eq!(DealItem::decode_all(&item.encoded()), Ok(item));
    }

    fn fixture_buy_limit_tx() -> DexTx {
        DexTx::buy_limit(LimitOrderTx::new(
            1000,
            RegId::new(100, 1),
            "WICC".into(),
            10_000,
            "WUSD".into(),
            "WICC".into(),
            1_000_000_000,
            100_000_000,
        ))
    }

    #[test]
    fn buy_limit_tx_blob_and_digests_are_frozen() {
        let tx = fixture_buy_limit_tx();
        assert_eq!(
            hex::encode(tx.encoded()),
            "540187680000006400010457494343ce100457555344045749434383dceb9400\
             afd7c20000"
        );
        assert_eq!(
            tx.hash().to_string(),
            "0x04388f2f8a6c2261d92ffa81f1c5ce6612c2769e9dae78d35be62ee2e574dfe7"
        );
        assert_eq!(
            tx.signature_digest().to_string(),
            "0x7c20006ef966ca25ace4814ebe7004882e0edd7f8242eae8644714c05659caf1"
        );
    }

    #[test]
    fn every_tx_variant_round_trips() {
        let uid = RegId::new(100, 1);
        let operator = OperatorParams {
            mode: OperatorMode::RequireAuth,
            dex_id: DexId(7),
            operator_fee_ratio: 400_000,
            memo: "memo".to_owned(),
            operator_regid: RegId::new(200, 1),
            operator_signature: Some(SignaturePair {
                regid: RegId::new(200, 1),
                signature: TxSignature(vec![5u8; 65]),
            }),
        };
        let limit = LimitOrderTx::new(
            10,
            uid,
            "WICC".into(),
            1,
            "WUSD".into(),
            "WICC".into(),
            500,
            100_000_000,
        );
        let market_buy =
            MarketBuyOrderTx::new(10, uid, "WICC".into(), 1, "WUSD".into(), "WICC".into(), 500);
        let market_sell =
            MarketSellOrderTx::new(10, uid, "WICC".into(), 1, "WUSD".into(), "WICC".into(), 500);
        let deal_items = vec![DealItem {
            buy_order_id: TxId([1; 32]),
            sell_order_id: TxId([2; 32]),
            deal_price: 100_000_000,
            deal_coin_amount: 500,
            deal_asset_amount: 500,
        }];
        let txs = vec![
            DexTx::buy_limit(limit.clone()),
            DexTx::sell_limit(limit.clone()),
            DexTx::buy_market(market_buy.clone()),
            DexTx::sell_market(market_sell.clone()),
            DexTx::buy_limit_ex(LimitOrderExTx {
                order: limit,
                operator: operator.clone(),
            }),
            DexTx::buy_market_ex(MarketBuyOrderExTx {
                order: market_buy,
                operator: operator.clone(),
            }),
            DexTx::sell_market_ex(MarketSellOrderExTx {
                order: market_sell,
                operator,
            }),
            DexTx::from(CancelOrderTx::new(10, uid, "WICC".into(), 1, TxId([9; 32]))),
            DexTx::from(SettleTx::new(10, uid, "WICC".into(), 1, deal_items.clone())),
            DexTx::from(SettleExTx::new(
                10,
                uid,
                "WICC".into(),
                1,
                DexId(7),
                deal_items,
                "settle memo".to_owned(),
            )),
        ];
        for tx in txs {
            assert_eq!(DexTx::decode_all(&tx.encoded()).as_ref(), Ok(&tx));
        }
    }

    #[test]
    fn settle_ex_digest_ignores_dex_id_and_memo() {
        let deal_items = vec![DealItem::default()];
        let a = DexTx::from(SettleExTx::new(
            10,
            RegId::new(100, 1),
            "WICC".into(),
            1,
            DexId(1),
            deal_items.clone(),
            "one".to_owned(),
        ));
        let b = DexTx::from(SettleExTx::new(
            10,
            RegId::new(100, 1),
            "WICC".into(),
            1,
            DexId(2),
            deal_items,
            "two".to_owned(),
        ));
        // Different wire bytes, identical digest: the known malleability.
        assert_ne!(a.encoded(), b.encoded());
        assert_eq!(a.signature_digest(), b.signature_digest());
    }

    #[test]
    fn decode_rejects_malformed_streams() {
        let tx = fixture_buy_limit_tx();
        let blob = tx.encoded();

        // Unknown tag byte.
        let mut bad_tag = blob.clone();
        bad_tag[0] = 0x00;
        assert_eq!(DexTx::decode_all(&bad_tag), Err(CodecError::UnknownEnum));

        // Truncated stream.
        assert_eq!(
            DexTx::decode_all(&blob[..blob.len() - 1]),
            Err(CodecError::Truncated)
        );

        // Trailing junk.
        let mut long = blob.clone();
        long.push(0);
        assert_eq!(DexTx::decode_all(&long), Err(CodecError::TrailingBytes));

        // Oversized vector count.
        let mut out = Vec::new();
        write_varint(&mut out, MAX_VEC_LEN + 1);
        assert_eq!(
            Vec::<DealItem>::decode_all(&out),
            Err(CodecError::OversizeVec)
        );

        // Bad option flag.
        assert_eq!(
            Option::<SignaturePair>::decode_all(&[2]),
            Err(CodecError::UnknownEnum)
        );

        // Non-UTF-8 string payload.
        let mut bad_string = Vec::new();
        write_varint(&mut bad_string, 2);
        bad_string.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(String::decode_all(&bad_string), Err(CodecError::BadString));
    }
}
