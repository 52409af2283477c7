//! 수신 스냅샷 타당성 검증.
//!
//! 브리지가 일시적으로 오염된 데이터(예: 다른 계좌의 잔고)를 반환해도
//! 영속 상태를 망가뜨리지 않도록 하는 휴리스틱입니다. 정상적인 대규모
//! 거래를 잘못 거부하는 쪽이 오염 데이터를 조용히 저장하는 쪽보다 낫다는
//! 트레이드오프를 의도적으로 선택했습니다.

use crate::error::ValidationError;
use mtsync_core::config::ValidationConfig;
use mtsync_core::types::{AccountInfo, AccountSnapshot};
use rust_decimal::Decimal;

/// 스냅샷 검증기.
#[derive(Debug, Clone)]
pub struct Validator {
    suspicious_change_pct: Decimal,
}

impl Validator {
    /// 설정에서 검증기 생성.
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            suspicious_change_pct: config.suspicious_change_pct,
        }
    }

    /// 수신 데이터를 직전 스냅샷과 비교하여 검증.
    ///
    /// 규칙 (순서대로 적용):
    /// 1. `balance`/`equity`/`margin`은 0 이상이어야 합니다. Decimal은 항상
    ///    유한하며 숫자가 아닌 payload는 파싱 단계에서 이미 거부됩니다.
    ///    (`profit`은 평가손실이 음수로 정상이므로 검사하지 않습니다)
    /// 2. 직전 잔고가 0보다 크면 변동률 `|new-old|/old*100`이 임계치를
    ///    넘는 경우 의심스러운 변동으로 거부합니다.
    pub fn validate(
        &self,
        previous: &AccountSnapshot,
        incoming: &AccountInfo,
    ) -> Result<(), ValidationError> {
        if incoming.balance < Decimal::ZERO {
            return Err(ValidationError::InvalidValue(format!(
                "balance가 음수입니다: {}",
                incoming.balance
            )));
        }
        if incoming.equity < Decimal::ZERO {
            return Err(ValidationError::InvalidValue(format!(
                "equity가 음수입니다: {}",
                incoming.equity
            )));
        }
        if incoming.margin < Decimal::ZERO {
            return Err(ValidationError::InvalidValue(format!(
                "margin이 음수입니다: {}",
                incoming.margin
            )));
        }

        if previous.balance > Decimal::ZERO {
            let pct = ((incoming.balance - previous.balance).abs() / previous.balance)
                * Decimal::from(100);
            if pct > self.suspicious_change_pct {
                return Err(ValidationError::SuspiciousChange { pct });
            }
        }

        Ok(())
    }
}
