use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{
	Condition, Filter, PointId, Query, QueryPointsBuilder, ScoredPoint, Value as QdrantValue,
	point_id::PointIdOptions, value::Kind,
};
use serde_json::{Map, Value};

use carlot_domain::{SemanticHit, TextField, Vehicle};

use crate::{Error, Result};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
}
impl QdrantStore {
	pub fn new(cfg: &carlot_config::SemanticBackend) -> Result<Self> {
		let url = cfg.url.as_deref().ok_or_else(|| {
			Error::InvalidArgument("backends.semantic.url is required.".to_string())
		})?;
		let collection = cfg.collection.clone().ok_or_else(|| {
			Error::InvalidArgument("backends.semantic.collection is required.".to_string())
		})?;
		let client = qdrant_client::Qdrant::from_url(url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self { client, collection })
	}

	/// Nearest neighbours of `vector` restricted to points whose payload matches every filter.
	pub async fn search(
		&self,
		vector: Vec<f32>,
		filters: &[(TextField, String)],
		top_k: u32,
	) -> Result<Vec<SemanticHit>> {
		let conditions: Vec<Condition> = filters
			.iter()
			.map(|(field, value)| Condition::matches(field.as_str(), value.clone()))
			.collect();
		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.limit(top_k as u64);

		if !conditions.is_empty() {
			search = search.filter(Filter::must(conditions));
		}

		let response = self.client.query(search).await?;

		Ok(response.result.into_iter().filter_map(scored_point_to_hit).collect())
	}
}

fn scored_point_to_hit(point: ScoredPoint) -> Option<SemanticHit> {
	let mut payload = payload_to_json(&point.payload);

	if !payload.contains_key("id")
		&& let Some(id) = point.id.as_ref().and_then(point_id_to_u64)
	{
		payload.insert("id".to_string(), Value::from(id));
	}

	let vehicle: Vehicle = match serde_json::from_value(Value::Object(payload)) {
		Ok(vehicle) => vehicle,
		Err(err) => {
			tracing::warn!(error = %err, "Skipping semantic hit with an invalid payload.");

			return None;
		},
	};

	Some(SemanticHit { id: vehicle.id, similarity: point.score.clamp(0.0, 1.0), payload: vehicle })
}

fn point_id_to_u64(point_id: &PointId) -> Option<u64> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Num(id)) => Some(*id),
		_ => None,
	}
}

fn payload_to_json(payload: &HashMap<String, QdrantValue>) -> Map<String, Value> {
	payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect()
}

fn value_to_json(value: &QdrantValue) -> Value {
	match &value.kind {
		Some(Kind::BoolValue(value)) => Value::Bool(*value),
		Some(Kind::IntegerValue(value)) => Value::from(*value),
		Some(Kind::DoubleValue(value)) => Value::from(*value),
		Some(Kind::StringValue(value)) => Value::String(value.clone()),
		Some(Kind::ListValue(list)) =>
			Value::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => Value::Object(payload_to_json(&object.fields)),
		Some(Kind::NullValue(_)) | None => Value::Null,
	}
}
