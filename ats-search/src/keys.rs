/// Key-construction helpers for documents stored in Redis.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
    pub service: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str, service: &'a str) -> Self {
        Self { prefix, service }
    }

    /// `prefix:service:collection:`, the RediSearch index prefix for a collection.
    pub fn collection_prefix(&self, collection: &str) -> String {
        format!("{}:{}:{}:", self.prefix, self.service, collection)
    }

    pub fn entity(&self, collection: &str, entity_id: &str) -> String {
        format!("{}{}", self.collection_prefix(collection), entity_id)
    }

    pub fn index(&self, collection: &str) -> String {
        format!("{}:{}:{}:idx", self.prefix, self.service, collection)
    }

    /// Glob matching every document of a collection.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}*", self.collection_prefix(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_keys() {
        let ctx = KeyContext::new("ats", "recruiting");
        assert_eq!(ctx.entity("candidates", "abc"), "ats:recruiting:candidates:abc");
        assert_eq!(ctx.index("candidates"), "ats:recruiting:candidates:idx");
        assert_eq!(ctx.collection_pattern("candidates"), "ats:recruiting:candidates:*");
    }
}
