use sha2::{Digest, Sha256};

use hlb_solve::State;

/// A content-addressed identifier for one resolved fetch — the vertex a
/// `seen` single-flight map and the cycle-detection frontier are both keyed
/// by. Derived from a canonical encoding of the fetch's LLB `State`, not the
/// importing module's own text, so two imports that fetch the same content
/// through differently-worded sources still collapse to one vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexDigest(String);

impl VertexDigest {
    pub fn of_state(state: &State) -> Self {
        let bytes = serde_json::to_vec(state).expect("State serializes infallibly");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Self(format!("sha256:{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits `sha256:abcd1234...` into `("sha256", "ab", "cd1234...")` for
    /// the vendor tree's `<algo>/<digest[0:2]>/<digest[2:]>` layout.
    pub fn path_parts(&self) -> (&str, &str, &str) {
        let (algo, hex) = self.0.split_once(':').expect("digest always carries an algo prefix");
        let (head, tail) = hex.split_at(2.min(hex.len()));
        (algo, head, tail)
    }
}

impl std::fmt::Display for VertexDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
