use chrono::Utc;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `{prefix}-{epoch millis}-{suffix}-{seq}` 형식의 id 생성
/// 같은 밀리초 안의 두 호출도 시퀀스로 구분된다.
pub fn timestamp_id(prefix: &str, suffix: impl Display) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        suffix,
        seq
    )
}
