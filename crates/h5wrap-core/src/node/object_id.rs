use std::fmt;

use h5wrap_sys::ObjectInfo;

/// Identity of an object: the file it lives in plus its token inside that
/// file. Two nodes opened on the same object compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    file_number: u64,
    token: [u8; 16],
}

impl ObjectId {
    pub fn file_number(&self) -> u64 {
        self.file_number
    }

    pub fn token(&self) -> &[u8; 16] {
        &self.token
    }
}

impl From<&ObjectInfo> for ObjectId {
    fn from(info: &ObjectInfo) -> Self {
        Self {
            file_number: info.fileno,
            token: info.token,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.file_number)?;
        for b in &self.token {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_info() {
        let mut info = ObjectInfo::default();
        info.fileno = 3;
        info.token[0] = 0xab;
        let id = ObjectId::from(&info);
        assert_eq!(id.file_number(), 3);
        assert!(id.to_string().starts_with("3:ab00"));
        assert_eq!(id.to_string().len(), 2 + 32);
    }
}
