use uuid::Uuid;

pub struct RedisKey;

impl RedisKey {
    pub fn aggregate(id: Uuid) -> String {
        format!("aggregate:{id}")
    }

    /// Sorted set of every aggregate id, scored by creation time.
    pub fn aggregates() -> String {
        "aggregates".to_string()
    }

    pub fn sample(id: Uuid) -> String {
        format!("sample:{id}")
    }

    /// Sorted set of the aggregate's active sample ids, scored by creation time.
    pub fn aggregate_samples(aggregate_id: Uuid) -> String {
        format!("aggregate:{aggregate_id}:samples")
    }

    /// Points at the author's single active sample on the aggregate.
    pub fn author_sample(aggregate_id: Uuid, author_id: Uuid) -> String {
        format!("aggregate:{aggregate_id}:author:{author_id}")
    }

    /// Hash of actor id to reaction code for one target.
    pub fn reactions(target_id: Uuid) -> String {
        format!("reactions:{target_id}")
    }

    pub fn favorites(actor_id: Uuid) -> String {
        format!("user:{actor_id}:favorites")
    }
}
