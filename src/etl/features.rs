use log::info;

use super::{
    classify::classify,
    overpass::{build_query, ElementSource},
    Etl,
};
use crate::{
    data::{AreaKind, CategoryKind, Classified, LineKind, NodeKind, OverpassResponse, RoundData},
    errors::Result,
    geometry::BoundingBox,
};

/// Fetches and classifies every enabled category of one shape.
pub struct FeatureEtl<'a, K: CategoryKind, F: ElementSource> {
    source: &'a F,
    bbox: BoundingBox,
    kinds: &'a [K],
    timeout_s: u32,
}

impl<'a, K: CategoryKind, F: ElementSource> FeatureEtl<'a, K, F> {
    pub fn new(source: &'a F, bbox: BoundingBox, kinds: &'a [K], timeout_s: u32) -> Self {
        FeatureEtl {
            source,
            bbox,
            kinds,
            timeout_s,
        }
    }
}

impl<K: CategoryKind, F: ElementSource> Etl for FeatureEtl<'_, K, F> {
    type Input = OverpassResponse;
    type Output = Classified<K>;

    fn etl_name(&self) -> &str {
        K::SHAPE.name()
    }

    async fn extract(&self) -> Result<Self::Input> {
        let query = build_query(&self.bbox, self.kinds, self.timeout_s);
        self.source.fetch(&query).await
    }

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let classified = classify(&input.elements, self.kinds);
        for (kind, features) in classified.iter() {
            info!(
                etl_name = self.etl_name(),
                category = kind.key(),
                count = features.len();
                "Classified features"
            );
        }
        Ok(classified)
    }
}

/// Runs the line, node and area pipelines concurrently. Any failure fails
/// the whole round.
pub async fn fetch_round<F: ElementSource>(
    source: &F,
    bbox: BoundingBox,
    timeout_s: u32,
) -> Result<RoundData> {
    let lines = FeatureEtl::new(source, bbox, LineKind::ALL, timeout_s);
    let nodes = FeatureEtl::new(source, bbox, NodeKind::ALL, timeout_s);
    let areas = FeatureEtl::new(source, bbox, AreaKind::ALL, timeout_s);

    let (lines, nodes, areas) =
        tokio::try_join!(lines.process(), nodes.process(), areas.process())?;
    Ok(RoundData { lines, nodes, areas })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        testing::{CannedSource, SAMPLE},
    };

    fn bbox() -> BoundingBox {
        BoundingBox::from_center(48.0, 8.0, 0.25)
    }

    #[tokio::test]
    async fn one_query_per_shape() {
        let source = CannedSource::new(SAMPLE);
        let data = fetch_round(&source, bbox(), 25).await.unwrap();

        assert_eq!(source.queries.borrow().len(), 3);
        assert_eq!(data.lines.get(LineKind::Railway).len(), 1);
        assert_eq!(data.lines.get(LineKind::Highway).len(), 1);
        assert!(data.lines.get(LineKind::Power).is_empty());
        assert_eq!(data.nodes.get(NodeKind::Tree).len(), 1);
        assert_eq!(data.nodes.get(NodeKind::PowerPole).len(), 1);
        assert_eq!(data.areas.get(AreaKind::Landuse).len(), 1);
    }

    #[tokio::test]
    async fn a_failing_fetch_fails_the_round() {
        let source = CannedSource::failing(429);
        let err = fetch_round(&source, bbox(), 25).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Http { status: 429 });
    }

    #[tokio::test]
    async fn same_response_same_result() {
        let source = CannedSource::new(SAMPLE);
        let first = fetch_round(&source, bbox(), 25).await.unwrap();
        let second = fetch_round(&source, bbox(), 25).await.unwrap();
        assert_eq!(first, second);
    }
}
