//! GSTIN and state-code value objects.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use forgebill_core::{DomainError, ValueObject};

const GSTIN_LEN: usize = 15;
const CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Two-digit GST state code (`"27"` = Maharashtra, `"29"` = Karnataka, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for StateCode {}

impl FromStr for StateCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "state code must be two digits, got {s:?}"
            )));
        }
        let n: u8 = s
            .parse()
            .map_err(|_| DomainError::validation(format!("invalid state code {s:?}")))?;
        // 97: other territory, 99: centre jurisdiction.
        if !((1..=38).contains(&n) || n == 97 || n == 99) {
            return Err(DomainError::validation(format!("unknown state code {s}")));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for StateCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateCode> for String {
    fn from(value: StateCode) -> Self {
        value.0
    }
}

impl core::fmt::Display for StateCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated 15-character GST identification number.
///
/// Layout: state code (2) + PAN (10) + entity number (1) + `Z` + checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl ValueObject for Gstin {}

impl Gstin {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// State of registration, taken from the first two digits.
    pub fn state_code(&self) -> StateCode {
        StateCode(self.0[..2].to_string())
    }

    /// The embedded PAN (characters 3 to 12).
    pub fn pan(&self) -> &str {
        &self.0[2..12]
    }

    /// Checksum character for the first fourteen characters.
    pub fn checksum_char(body: &str) -> Option<char> {
        let mut sum: u32 = 0;
        for (i, b) in body.bytes().take(GSTIN_LEN - 1).enumerate() {
            let value = CHARSET.iter().position(|c| *c == b)? as u32;
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            sum += product / 36 + product % 36;
        }
        let check = (36 - sum % 36) % 36;
        Some(CHARSET[check as usize] as char)
    }
}

impl FromStr for Gstin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        if s.len() != GSTIN_LEN || !s.is_ascii() {
            return Err(DomainError::validation(format!(
                "GSTIN must be {GSTIN_LEN} characters"
            )));
        }

        s[..2].parse::<StateCode>()?;

        let bytes = s.as_bytes();
        let pan_ok = bytes[2..7].iter().all(u8::is_ascii_uppercase)
            && bytes[7..11].iter().all(u8::is_ascii_digit)
            && bytes[11].is_ascii_uppercase();
        if !pan_ok {
            return Err(DomainError::validation("GSTIN has a malformed PAN segment"));
        }
        if !(bytes[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&bytes[12])) {
            return Err(DomainError::validation("GSTIN entity number is invalid"));
        }
        if bytes[13] != b'Z' {
            return Err(DomainError::validation("GSTIN 14th character must be 'Z'"));
        }

        let expected = Self::checksum_char(&s)
            .ok_or_else(|| DomainError::validation("GSTIN contains invalid characters"))?;
        if bytes[14] as char != expected {
            return Err(DomainError::validation("GSTIN checksum mismatch"));
        }

        Ok(Self(s))
    }
}

impl TryFrom<String> for Gstin {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gstin> for String {
    fn from(value: Gstin) -> Self {
        value.0
    }
}

impl core::fmt::Display for Gstin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_gstins() {
        for raw in ["27AAPFU0939F1ZV", "29AABCT1332L1ZA", "07aaacr5055k1z9"] {
            let gstin: Gstin = raw.parse().unwrap();
            assert_eq!(gstin.as_str(), raw.to_ascii_uppercase());
        }
    }

    #[test]
    fn exposes_state_code_and_pan() {
        let gstin: Gstin = "33AAACH7409R1Z8".parse().unwrap();
        assert_eq!(gstin.state_code().as_str(), "33");
        assert_eq!(gstin.pan(), "AAACH7409R");
    }

    #[test]
    fn rejects_bad_checksum() {
        let err = "27AAPFU0939F1ZA".parse::<Gstin>().unwrap_err();
        assert_eq!(err, DomainError::validation("GSTIN checksum mismatch"));
    }

    #[test]
    fn rejects_unknown_state_and_bad_length() {
        assert!("40AAPFU0939F1ZV".parse::<Gstin>().is_err());
        assert!("27AAPFU0939F1Z".parse::<Gstin>().is_err());
        assert!("27AAPFU0939F1XV".parse::<Gstin>().is_err());
    }

    #[test]
    fn state_codes_cover_special_jurisdictions() {
        assert!("97".parse::<StateCode>().is_ok());
        assert!("99".parse::<StateCode>().is_ok());
        assert!("00".parse::<StateCode>().is_err());
        assert!("7".parse::<StateCode>().is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: Gstin = serde_json::from_str("\"27AAPFU0939F1ZV\"").unwrap();
        assert_eq!(ok.state_code().as_str(), "27");
        assert!(serde_json::from_str::<Gstin>("\"27AAPFU0939F1ZA\"").is_err());
    }
}
