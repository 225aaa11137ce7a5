use rand::Rng;
use rand::seq::SliceRandom;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const MAX_SLUG_LEN: usize = 24;

/// 部门名转成用户名前缀：小写字母数字，其余字符折叠为单个下划线
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug: String = slug.trim_end_matches('_').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "dept".to_string()
    } else {
        slug
    }
}

/// `{slug}_{100..999}`
pub fn generate_department_username(department_name: &str) -> String {
    let suffix: u16 = rand::rng().random_range(100..1000);
    format!("{}_{suffix}", slugify(department_name))
}

/// 随机字母数字密码，至少包含一个字母和一个数字
pub fn generate_password(length: usize) -> String {
    let length = length.max(2);
    let mut rng = rand::rng();
    let mut chars: Vec<u8> = Vec::with_capacity(length);
    chars.push(LETTERS[rng.random_range(0..LETTERS.len())]);
    chars.push(DIGITS[rng.random_range(0..DIGITS.len())]);
    while chars.len() < length {
        let pool = if rng.random_bool(0.7) { LETTERS } else { DIGITS };
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Civil Engineering"), "civil_engineering");
        assert_eq!(slugify("  R&D -- Labs!! "), "r_d_labs");
        assert_eq!(slugify("###"), "dept");
    }

    #[test]
    fn test_department_username_shape() {
        let username = generate_department_username("Computer Science");
        let (prefix, suffix) = username.rsplit_once('_').unwrap();
        assert_eq!(prefix, "computer_science");
        let n: u16 = suffix.parse().unwrap();
        assert!((100..=999).contains(&n));
    }

    #[test]
    fn test_generated_password() {
        for _ in 0..50 {
            let pwd = generate_password(8);
            assert_eq!(pwd.len(), 8);
            assert!(pwd.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(pwd.chars().any(|c| c.is_ascii_digit()));
            assert!(pwd.chars().any(|c| c.is_ascii_alphabetic()));
        }
    }
}
