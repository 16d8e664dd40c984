use anyhow::{Result, ensure};

/// A disjoint-set (union-find) structure over `0..len` with path compression
/// and union-by-rank.
///
/// All operations validate index bounds and return a descriptive error on
/// out-of-range input rather than panicking or silently ignoring the call.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Create `len` singleton sets.
    pub fn new(len: usize) -> Self {
        debug_assert!(len <= u32::MAX as usize, "element count exceeds u32 range");
        Self {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
        }
    }

    /// Number of elements (not sets).
    #[inline] pub fn len(&self) -> usize { self.parent.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.parent.is_empty() }

    #[inline]
    fn check(&self, x: usize) -> Result<()> {
        ensure!(x < self.parent.len(), "index {} out of range for {} elements", x, self.parent.len());
        Ok(())
    }

    /// Representative of the set containing `x`, with path compression.
    pub fn find(&mut self, x: usize) -> Result<usize> {
        self.check(x)?;

        let mut root = x;
        while self.parent[root] as usize != root {
            root = self.parent[root] as usize;
        }

        // Second pass: point every node on the path directly at the root.
        let mut node = x;
        while self.parent[node] as usize != root {
            let next = self.parent[node] as usize;
            self.parent[node] = root as u32;
            node = next;
        }

        Ok(root)
    }

    /// Merge the sets containing `x` and `y` (union-by-rank). Returns `true`
    /// if the sets were distinct.
    pub fn union(&mut self, x: usize, y: usize) -> Result<bool> {
        let rx = self.find(x)?;
        let ry = self.find(y)?;
        if rx == ry {
            return Ok(false);
        }

        match self.rank[rx].cmp(&self.rank[ry]) {
            std::cmp::Ordering::Less => self.parent[rx] = ry as u32,
            std::cmp::Ordering::Greater => self.parent[ry] = rx as u32,
            std::cmp::Ordering::Equal => {
                self.parent[ry] = rx as u32;
                self.rank[rx] += 1;
            }
        }

        Ok(true)
    }

    /// Whether `x` and `y` are in the same set.
    pub fn connected(&mut self, x: usize, y: usize) -> Result<bool> {
        Ok(self.find(x)? == self.find(y)?)
    }
}
