use std::sync::Arc;

use geojson::{FeatureCollection, GeoJson};
use log::info;
use tokio::sync::oneshot;

use crate::config::OverlaySources;
use crate::error::AtlasError;
use crate::layer::boundary::convert_collection;
use crate::layer::{BoundaryFeature, OverlayKind};
use crate::loader::DataProvider;
use crate::messenger::Messenger;

/// Converted features of all three boundary layers.
#[derive(Debug, Clone, Default)]
pub struct BoundaryData {
    /// District features.
    pub districts: Vec<BoundaryFeature>,
    /// Municipality features.
    pub municipalities: Vec<BoundaryFeature>,
    /// Ward features.
    pub wards: Vec<BoundaryFeature>,
}

impl BoundaryData {
    /// Splits the data into layers in drawing order.
    pub fn into_layers(self) -> [(OverlayKind, Vec<BoundaryFeature>); 3] {
        [
            (OverlayKind::District, self.districts),
            (OverlayKind::Municipality, self.municipalities),
            (OverlayKind::Ward, self.wards),
        ]
    }
}

/// Parses a GeoJSON document into a feature collection.
///
/// A single feature is accepted as a one-element collection. A bare geometry is an error.
pub fn decode_feature_collection(bytes: &[u8]) -> Result<FeatureCollection, AtlasError> {
    let text = std::str::from_utf8(bytes).map_err(|err| AtlasError::Decoding(err.to_string()))?;
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(AtlasError::Decoding(
            "expected a feature collection, got a bare geometry".into(),
        )),
    }
}

async fn load_layer(
    provider: &dyn DataProvider,
    kind: OverlayKind,
    url: &str,
) -> Result<Vec<BoundaryFeature>, AtlasError> {
    let bytes = provider.load_bytes(url).await?;
    let collection = decode_feature_collection(&bytes)?;
    let features = convert_collection(kind, collection)?;
    info!("Loaded {} {} features from {url}", features.len(), kind.feature_name());

    Ok(features)
}

/// Loads all three boundary layers concurrently.
///
/// Succeeds only if every layer loads. The first failure is returned and the other loads are
/// dropped.
pub async fn load_boundaries(
    provider: &dyn DataProvider,
    sources: &OverlaySources,
) -> Result<BoundaryData, AtlasError> {
    let (districts, municipalities, wards) = futures::try_join!(
        load_layer(provider, OverlayKind::District, &sources.districts.url),
        load_layer(provider, OverlayKind::Municipality, &sources.municipalities.url),
        load_layer(provider, OverlayKind::Ward, &sources.wards.url),
    )?;

    Ok(BoundaryData {
        districts,
        municipalities,
        wards,
    })
}

/// Handle of a boundary load running in the background.
#[derive(Debug)]
pub struct BoundaryLoad {
    receiver: oneshot::Receiver<Result<BoundaryData, AtlasError>>,
}

impl BoundaryLoad {
    /// Starts loading on the current tokio runtime.
    ///
    /// The messenger is notified when the load finishes, successfully or not.
    pub fn spawn(
        provider: Arc<dyn DataProvider>,
        sources: OverlaySources,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Self {
        let (sender, receiver) = oneshot::channel();
        tokio::spawn(async move {
            let result = load_boundaries(provider.as_ref(), &sources).await;
            if sender.send(result).is_err() {
                log::debug!("Boundary load finished after its handle was dropped");
            }

            if let Some(messenger) = messenger {
                messenger.request_redraw();
            }
        });

        Self { receiver }
    }

    /// Returns the result once the load has finished. `None` while it is still running.
    pub fn poll(&mut self) -> Option<Result<BoundaryData, AtlasError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(AtlasError::Cancelled)),
        }
    }
}
