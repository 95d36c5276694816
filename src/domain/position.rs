use crate::error::{KisekiError, Result};

/// Base-62 digits in ascending byte order
pub const DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Key handed out for an empty column
pub const FIRST_KEY: &str = "a0";

const ZERO: u8 = DIGITS[0];
const LAST: u8 = DIGITS[DIGITS.len() - 1];

/// Smallest integer part. Reserved so there is always room below any key.
const SMALLEST_INTEGER: &str = "A00000000000000000000000000";

/// Generates a key strictly between `lower` and `upper`.
///
/// Either bound may be absent to mean "before everything" / "after
/// everything". With both absent the result is [`FIRST_KEY`].
///
/// A key is an integer part followed by an optional fraction. The head
/// character of the integer part encodes how many base-62 digits follow it:
/// `a`..`z` carry 1..26 digits, `A`..`Z` carry 26..1 digits and sort below
/// every lower-case head. Keys compare byte-wise.
///
/// # Examples
/// ```
/// use kiseki_core::domain::position::generate_key_between;
///
/// let first = generate_key_between(None, None).unwrap();
/// let second = generate_key_between(Some(&first), None).unwrap();
/// let middle = generate_key_between(Some(&first), Some(&second)).unwrap();
/// assert!(first < middle && middle < second);
/// ```
pub fn generate_key_between(lower: Option<&str>, upper: Option<&str>) -> Result<String> {
    if let Some(lower) = lower {
        validate_key(lower)?;
    }
    if let Some(upper) = upper {
        validate_key(upper)?;
    }

    match (lower, upper) {
        (None, None) => Ok(FIRST_KEY.to_string()),
        (None, Some(upper)) => {
            let int = integer_part(upper)?;
            let frac = &upper[int.len()..];
            if int == SMALLEST_INTEGER {
                return Ok(format!("{}{}", int, midpoint("", Some(frac))?));
            }
            if int.len() < upper.len() {
                // `upper` has a fraction, so its bare integer part sorts below it
                return Ok(int.to_string());
            }
            decrement_integer(int)?.ok_or(KisekiError::KeySpaceExhausted)
        }
        (Some(lower), None) => {
            let int = integer_part(lower)?;
            let frac = &lower[int.len()..];
            match increment_integer(int)? {
                Some(next) => Ok(next),
                None => Ok(format!("{}{}", int, midpoint(frac, None)?)),
            }
        }
        (Some(lower), Some(upper)) => {
            if lower >= upper {
                return Err(invalid_order(lower, upper));
            }
            let int_lower = integer_part(lower)?;
            let frac_lower = &lower[int_lower.len()..];
            let int_upper = integer_part(upper)?;
            let frac_upper = &upper[int_upper.len()..];

            if int_lower == int_upper {
                return Ok(format!(
                    "{}{}",
                    int_lower,
                    midpoint(frac_lower, Some(frac_upper))?
                ));
            }

            let next = increment_integer(int_lower)?.ok_or(KisekiError::KeySpaceExhausted)?;
            if next.as_str() < upper {
                Ok(next)
            } else {
                Ok(format!("{}{}", int_lower, midpoint(frac_lower, None)?))
            }
        }
    }
}

/// Generates `n` ascending keys strictly between `lower` and `upper`.
pub fn generate_n_keys_between(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
) -> Result<Vec<String>> {
    match n {
        0 => Ok(Vec::new()),
        1 => Ok(vec![generate_key_between(lower, upper)?]),
        _ => match (lower, upper) {
            (_, None) => {
                let mut keys = Vec::with_capacity(n);
                let mut prev = lower.map(str::to_string);
                for _ in 0..n {
                    let key = generate_key_between(prev.as_deref(), None)?;
                    keys.push(key.clone());
                    prev = Some(key);
                }
                Ok(keys)
            }
            (None, Some(_)) => {
                let mut keys = Vec::with_capacity(n);
                let mut next = upper.map(str::to_string);
                for _ in 0..n {
                    let key = generate_key_between(None, next.as_deref())?;
                    keys.push(key.clone());
                    next = Some(key);
                }
                keys.reverse();
                Ok(keys)
            }
            (Some(_), Some(_)) => {
                // Split around a middle key so lengths grow logarithmically
                let mid = n / 2;
                let key = generate_key_between(lower, upper)?;
                let mut keys = generate_n_keys_between(lower, Some(&key), mid)?;
                keys.push(key.clone());
                keys.extend(generate_n_keys_between(Some(&key), upper, n - mid - 1)?);
                Ok(keys)
            }
        },
    }
}

/// Checks that `key` is a well-formed position key
pub fn validate_key(key: &str) -> Result<()> {
    if key == SMALLEST_INTEGER {
        return Err(KisekiError::InvalidPositionKey(key.to_string()));
    }
    if let Some(bad) = key.bytes().find(|b| digit_value(*b).is_none()) {
        return Err(KisekiError::InvalidPositionKey(format!(
            "{} (unexpected character {:?})",
            key, bad as char
        )));
    }
    let int = integer_part(key)?;
    if key[int.len()..].ends_with(ZERO as char) {
        return Err(KisekiError::InvalidPositionKey(format!(
            "{} (fraction ends in zero)",
            key
        )));
    }
    Ok(())
}

/// Returns a key strictly between the fractions `lower` and `upper`.
///
/// Both are digit strings without an integer part. `lower` may be empty;
/// an absent `upper` means one past the last digit.
fn midpoint(lower: &str, upper: Option<&str>) -> Result<String> {
    if let Some(upper) = upper {
        if lower >= upper {
            return Err(invalid_order(lower, upper));
        }
    }
    if lower.ends_with(ZERO as char) || upper.is_some_and(|u| u.ends_with(ZERO as char)) {
        return Err(KisekiError::InvalidPositionKey(format!(
            "trailing zero in fraction {:?}",
            lower
        )));
    }

    if let Some(upper) = upper {
        // Shared prefix, padding `lower` with zeros
        let lower_bytes = lower.as_bytes();
        let common = upper
            .bytes()
            .enumerate()
            .take_while(|(i, b)| lower_bytes.get(*i).copied().unwrap_or(ZERO) == *b)
            .count();
        if common > 0 {
            let rest = midpoint(lower.get(common..).unwrap_or(""), Some(&upper[common..]))?;
            return Ok(format!("{}{}", &upper[..common], rest));
        }
    }

    let digit_lower = match lower.bytes().next() {
        Some(b) => digit_index(b)?,
        None => 0,
    };
    let digit_upper = match upper.and_then(|u| u.bytes().next()) {
        Some(b) => digit_index(b)?,
        None => DIGITS.len(),
    };

    if digit_upper > digit_lower + 1 {
        let mid = (digit_lower + digit_upper + 1) / 2;
        Ok((DIGITS[mid] as char).to_string())
    } else {
        match upper {
            Some(upper) if upper.len() > 1 => Ok(upper[..1].to_string()),
            _ => Ok(format!(
                "{}{}",
                DIGITS[digit_lower] as char,
                midpoint(lower.get(1..).unwrap_or(""), None)?
            )),
        }
    }
}

/// Number of characters (head included) in an integer part with this head
fn integer_length(head: u8) -> Result<usize> {
    match head {
        b'a'..=b'z' => Ok((head - b'a') as usize + 2),
        b'A'..=b'Z' => Ok((b'Z' - head) as usize + 2),
        _ => Err(KisekiError::InvalidPositionKey(format!(
            "invalid head {:?}",
            head as char
        ))),
    }
}

fn integer_part(key: &str) -> Result<&str> {
    let head = key
        .bytes()
        .next()
        .ok_or_else(|| KisekiError::InvalidPositionKey("empty key".to_string()))?;
    let len = integer_length(head)?;
    key.get(..len)
        .ok_or_else(|| KisekiError::InvalidPositionKey(key.to_string()))
}

fn validate_integer(int: &str) -> Result<()> {
    let head = int
        .bytes()
        .next()
        .ok_or_else(|| KisekiError::InvalidPositionKey("empty integer".to_string()))?;
    if integer_length(head)? != int.len() {
        return Err(KisekiError::InvalidPositionKey(int.to_string()));
    }
    Ok(())
}

/// Next integer part, or `None` past the largest representable integer
fn increment_integer(int: &str) -> Result<Option<String>> {
    validate_integer(int)?;
    let head = int.as_bytes()[0];
    let mut digits = int.as_bytes()[1..].to_vec();

    let mut carry = true;
    for slot in digits.iter_mut().rev() {
        let next = digit_index(*slot)? + 1;
        if next == DIGITS.len() {
            *slot = ZERO;
        } else {
            *slot = DIGITS[next];
            carry = false;
            break;
        }
    }

    if !carry {
        return Ok(Some(assemble(head, &digits)));
    }
    match head {
        b'Z' => Ok(Some(FIRST_KEY.to_string())),
        b'z' => Ok(None),
        _ => {
            let next_head = head + 1;
            if next_head > b'a' {
                digits.push(ZERO);
            } else {
                digits.pop();
            }
            Ok(Some(assemble(next_head, &digits)))
        }
    }
}

/// Previous integer part, or `None` below the smallest representable integer
fn decrement_integer(int: &str) -> Result<Option<String>> {
    validate_integer(int)?;
    let head = int.as_bytes()[0];
    let mut digits = int.as_bytes()[1..].to_vec();

    let mut borrow = true;
    for slot in digits.iter_mut().rev() {
        let index = digit_index(*slot)?;
        if index == 0 {
            *slot = LAST;
        } else {
            *slot = DIGITS[index - 1];
            borrow = false;
            break;
        }
    }

    if !borrow {
        return Ok(Some(assemble(head, &digits)));
    }
    match head {
        b'a' => Ok(Some(format!("Z{}", LAST as char))),
        b'A' => Ok(None),
        _ => {
            let prev_head = head - 1;
            if prev_head < b'Z' {
                digits.push(LAST);
            } else {
                digits.pop();
            }
            Ok(Some(assemble(prev_head, &digits)))
        }
    }
}

fn assemble(head: u8, digits: &[u8]) -> String {
    let mut out = String::with_capacity(digits.len() + 1);
    out.push(head as char);
    out.extend(digits.iter().map(|&d| d as char));
    out
}

fn digit_value(byte: u8) -> Option<usize> {
    DIGITS.iter().position(|&d| d == byte)
}

fn digit_index(byte: u8) -> Result<usize> {
    digit_value(byte).ok_or_else(|| {
        KisekiError::InvalidPositionKey(format!("unexpected character {:?}", byte as char))
    })
}

fn invalid_order(lower: &str, upper: &str) -> KisekiError {
    KisekiError::InvalidOrder {
        lower: lower.to_string(),
        upper: upper.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn between(lower: Option<&str>, upper: Option<&str>) -> String {
        generate_key_between(lower, upper).unwrap()
    }

    #[test]
    fn test_empty_sequence_key() {
        assert_eq!(between(None, None), "a0");
    }

    #[test]
    fn test_known_keys() {
        assert_eq!(between(Some("a0"), None), "a1");
        assert_eq!(between(Some("a1"), None), "a2");
        assert_eq!(between(Some("az"), None), "b00");
        assert_eq!(between(None, Some("a0")), "Zz");
        assert_eq!(between(Some("a0"), Some("a1")), "a0V");
        assert_eq!(between(Some("a1"), Some("a2")), "a1V");
        assert_eq!(between(Some("a0V"), Some("a1")), "a0l");
        assert_eq!(between(Some("Zz"), Some("a0")), "ZzV");
        assert_eq!(between(None, Some("a0V")), "a0");
        assert_eq!(between(Some("a0"), Some("a0V")), "a0G");
    }

    #[test]
    fn test_end_placement_strictly_increasing() {
        let mut last = between(None, None);
        for _ in 0..500 {
            let next = between(Some(&last), None);
            assert!(next > last, "{} should sort after {}", next, last);
            last = next;
        }
    }

    #[test]
    fn test_start_placement_strictly_decreasing() {
        let mut first = between(None, None);
        for _ in 0..500 {
            let prev = between(None, Some(&first));
            assert!(prev < first, "{} should sort before {}", prev, first);
            first = prev;
        }
    }

    #[test]
    fn test_density_shrinking_upper() {
        let lower = "a0".to_string();
        let mut upper = "a1".to_string();
        for _ in 0..150 {
            let key = between(Some(&lower), Some(&upper));
            assert!(lower < key && key < upper);
            upper = key;
        }
    }

    #[test]
    fn test_density_shrinking_lower() {
        let mut lower = "a0".to_string();
        let upper = "a1".to_string();
        for _ in 0..150 {
            let key = between(Some(&lower), Some(&upper));
            assert!(lower < key && key < upper);
            lower = key;
        }
    }

    #[test]
    fn test_density_alternating_bounds() {
        let mut lower = "a0".to_string();
        let mut upper = "a1".to_string();
        for i in 0..200 {
            let key = between(Some(&lower), Some(&upper));
            assert!(lower < key && key < upper);
            if i % 2 == 0 {
                lower = key;
            } else {
                upper = key;
            }
        }
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(
            generate_key_between(Some("a1"), Some("a0")),
            Err(KisekiError::InvalidOrder { .. })
        ));
        assert!(matches!(
            generate_key_between(Some("a1"), Some("a1")),
            Err(KisekiError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "a", "a00", "a0 ", "b1", "!", SMALLEST_INTEGER] {
            assert!(
                matches!(
                    generate_key_between(Some(key), None),
                    Err(KisekiError::InvalidPositionKey(_))
                ),
                "{:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_largest_integer_extends_fraction() {
        let largest = "z".repeat(27);
        let next = between(Some(&largest), None);
        assert!(next > largest);
        assert!(next.starts_with(&largest));
    }

    #[test]
    fn test_generate_n_keys_between() {
        let keys = generate_n_keys_between(Some("a0"), Some("a1"), 10).unwrap();
        assert_eq!(keys.len(), 10);
        assert!(keys.first().unwrap().as_str() > "a0");
        assert!(keys.last().unwrap().as_str() < "a1");
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let tail = generate_n_keys_between(None, None, 3).unwrap();
        assert_eq!(tail, vec!["a0", "a1", "a2"]);

        let head = generate_n_keys_between(None, Some("a0"), 2).unwrap();
        assert!(head[0] < head[1] && head[1].as_str() < "a0");

        assert!(generate_n_keys_between(None, None, 0).unwrap().is_empty());
    }
}
