use std::fmt;

/// Primary key of a persisted [`Dev`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DevId(pub i64);

impl fmt::Display for DevId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A developer who collects freebies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dev {
    pub id: DevId,
    pub name: String,
}

impl fmt::Display for Dev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Dev {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_name() {
        // Arrange
        let dev = Dev {
            id: DevId(1),
            name: "Alice".to_string(),
        };

        // Act
        let rendered = dev.to_string();

        // Assert
        assert_eq!(rendered, "<Dev Alice>");
    }
}
