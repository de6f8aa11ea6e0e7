pub mod constants;
pub mod evaluation;
pub mod id;
pub mod policy;
pub mod record;
pub mod trial;
pub mod vertex;
pub mod warning;

pub use evaluation::{Evaluation, Label, LabelError};
pub use id::{IdError, SubtrialId, TrialKey};
pub use policy::BoundaryPolicy;
pub use record::{FeatureVector, MasterRecord};
pub use trial::{Sample, Subtrial, Trial, event_positions, press_onsets};
pub use vertex::{Point, VertexError, VertexTable};
pub use warning::Warning;
