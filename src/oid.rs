//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for
//! common identifiers.

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Object Identifier: a hierarchical dotted-integer path.
///
/// Ordering is arc-wise numeric, so `1.2` sorts before `1.10` - the order
/// devices return values in during a lexicographic walk. This is the property
/// the discovery-list sort and the skip-ahead logic in
/// [`SnmpSession::walk_device`](crate::session::SnmpSession::walk_device)
/// rely on.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// # Examples
    ///
    /// ```
    /// use mibgraph::oid::Oid;
    ///
    /// let oid = Oid::new(vec![1, 3, 6, 1, 2, 1]);
    /// assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1]);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g. `"1.3.6.1.2.1.1"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use mibgraph::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
    /// assert_eq!(oid.len(), 9);
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid(s.to_string()))?;
            arcs.push(arc);
        }
        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Get the final arc, or `None` for an empty OID.
    pub fn last(&self) -> Option<u32> {
        self.arcs.last().copied()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with the empty
    /// OID.
    ///
    /// # Examples
    ///
    /// ```
    /// use mibgraph::oid::Oid;
    ///
    /// let leaf = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
    /// let subtree = Oid::parse("1.3.6.1.2.1.1").unwrap();
    /// assert!(leaf.starts_with(&subtree));
    /// assert!(!subtree.starts_with(&leaf));
    /// ```
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        if self.arcs.is_empty() {
            None
        } else {
            Some(Oid {
                arcs: SmallVec::from_slice(&self.arcs[..self.arcs.len() - 1]),
            })
        }
    }

    /// Create a child OID by appending an arc.
    ///
    /// # Examples
    ///
    /// ```
    /// use mibgraph::oid::Oid;
    ///
    /// let group = Oid::parse("1.3.6.1.2.1.1").unwrap();
    /// assert_eq!(group.child(1).to_string(), "1.3.6.1.2.1.1.1");
    /// ```
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// The trailing `count` arcs as a dot-joined string, in original order.
    ///
    /// This is how table-row index strings are reconstructed from an
    /// index-bearing value OID. Returns `None` when the OID is shorter than
    /// `count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mibgraph::oid::Oid;
    ///
    /// let oid = Oid::parse("1.2.3.1.10.11.12").unwrap();
    /// assert_eq!(oid.index_suffix(3).as_deref(), Some("10.11.12"));
    /// ```
    pub fn index_suffix(&self, count: usize) -> Option<String> {
        if count > self.arcs.len() {
            return None;
        }
        let start = self.arcs.len() - count;
        let mut out = String::new();
        for (i, arc) in self.arcs[start..].iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&arc.to_string());
        }
        Some(out)
    }

    /// A copy of this OID with the final arc decremented.
    ///
    /// Returns `None` for an empty OID or one whose final arc is already 0.
    pub fn with_last_decremented(&self) -> Option<Oid> {
        let last = self.last()?;
        if last == 0 {
            return None;
        }
        let mut arcs = self.arcs.clone();
        *arcs.last_mut().expect("non-empty") = last - 1;
        Some(Oid { arcs })
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Macro to create an OID from literal arcs.
///
/// # Examples
///
/// ```
/// use mibgraph::oid;
///
/// let sys_object_id = oid!(1, 3, 6, 1, 2, 1, 1, 2, 0);
/// assert_eq!(sys_object_id.to_string(), "1.3.6.1.2.1.1.2.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
