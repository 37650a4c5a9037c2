//! 인메모리 저장소 구현
//!
//! 테스트와 로컬 실행용입니다. 조건부 재고 차감과 주문 유니크 제약 등
//! 행 저장소가 보장해야 하는 의미론을 그대로 재현합니다.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::{SeckillVoucher, Shop, VoucherOrder};

use super::{SeckillVoucherStore, ShopStore, VoucherOrderStore};

/// 인메모리 매장 저장소
#[derive(Default)]
pub struct InMemoryShopStore {
    shops: RwLock<HashMap<i64, Shop>>,
}

impl InMemoryShopStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, shop: Shop) {
        self.shops.write().unwrap().insert(shop.id, shop);
    }
}

#[async_trait]
impl ShopStore for InMemoryShopStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Shop>> {
        Ok(self.shops.read().unwrap().get(&id).cloned())
    }

    async fn update(&self, shop: &Shop) -> AppResult<bool> {
        let mut shops = self.shops.write().unwrap();
        if !shops.contains_key(&shop.id) {
            return Ok(false);
        }
        shops.insert(shop.id, shop.clone());
        Ok(true)
    }
}

/// 인메모리 쿠폰 저장소
#[derive(Default)]
pub struct InMemorySeckillVoucherStore {
    vouchers: RwLock<HashMap<i64, SeckillVoucher>>,
}

impl InMemorySeckillVoucherStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeckillVoucherStore for InMemorySeckillVoucherStore {
    async fn find_by_id(&self, voucher_id: i64) -> AppResult<Option<SeckillVoucher>> {
        Ok(self.vouchers.read().unwrap().get(&voucher_id).cloned())
    }

    async fn save(&self, voucher: &SeckillVoucher) -> AppResult<()> {
        self.vouchers
            .write()
            .unwrap()
            .insert(voucher.voucher_id, voucher.clone());
        Ok(())
    }

    async fn decrement_stock(&self, voucher_id: i64) -> AppResult<bool> {
        let mut vouchers = self.vouchers.write().unwrap();
        let voucher = vouchers
            .get_mut(&voucher_id)
            .ok_or_else(|| AppError::ValidationError(format!("없는 쿠폰: {}", voucher_id)))?;

        // stock > 0 조건 하에서만 차감 - 재고는 절대 음수가 되지 않음
        if voucher.stock <= 0 {
            return Ok(false);
        }
        voucher.stock -= 1;
        Ok(true)
    }

    async fn increment_stock(&self, voucher_id: i64) -> AppResult<()> {
        let mut vouchers = self.vouchers.write().unwrap();
        let voucher = vouchers
            .get_mut(&voucher_id)
            .ok_or_else(|| AppError::ValidationError(format!("없는 쿠폰: {}", voucher_id)))?;
        voucher.stock += 1;
        Ok(())
    }
}

/// 인메모리 주문 저장소
///
/// `(user_id, voucher_id)` 유니크 제약을 재현합니다.
#[derive(Default)]
pub struct InMemoryVoucherOrderStore {
    orders: RwLock<HashMap<i64, VoucherOrder>>,
    user_voucher_index: RwLock<HashSet<(i64, i64)>>,
}

impl InMemoryVoucherOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.orders.read().unwrap().len()
    }
}

#[async_trait]
impl VoucherOrderStore for InMemoryVoucherOrderStore {
    async fn exists(&self, user_id: i64, voucher_id: i64) -> AppResult<bool> {
        Ok(self
            .user_voucher_index
            .read()
            .unwrap()
            .contains(&(user_id, voucher_id)))
    }

    async fn save(&self, order: &VoucherOrder) -> AppResult<bool> {
        let mut index = self.user_voucher_index.write().unwrap();
        if !index.insert((order.user_id, order.voucher_id)) {
            // 유니크 제약 위반 - 에러가 아니라 false (멱등 처리 대상)
            return Ok(false);
        }
        self.orders.write().unwrap().insert(order.id, order.clone());
        Ok(true)
    }
}
