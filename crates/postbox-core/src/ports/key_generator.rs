//! KeyGenerator port - payload キー生成の抽象化
//!
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UuidKeyGenerator**: UUID v4 ベース（本番用）

use uuid::Uuid;

use crate::domain::PayloadKey;

/// KeyGenerator は衝突しない payload キーを生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドの submit から呼ばれる）
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> PayloadKey;
}

/// UUID v4 で payload キーを生成
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> PayloadKey {
        PayloadKey::from_uuid(Uuid::new_v4())
    }
}
