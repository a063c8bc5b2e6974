use rand::Rng;

const VOUCHER_CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成优惠券码，形如 `PROMO-7K2QX9MB`
pub fn generate_voucher_code() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..8)
        .map(|_| VOUCHER_CODE_CHARS[rng.gen_range(0..VOUCHER_CODE_CHARS.len())] as char)
        .collect();
    format!("PROMO-{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_voucher_code() {
        let code = generate_voucher_code();
        assert_eq!(code.len(), 14);
        assert!(code.starts_with("PROMO-"));
        assert!(
            code[6..]
                .bytes()
                .all(|b| VOUCHER_CODE_CHARS.contains(&b))
        );
    }
}
