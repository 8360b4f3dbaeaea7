pub mod feature_key;
pub mod feature_vector;
pub mod lobby;
pub mod match_data;
pub mod model_weights;
pub mod player_rating;
pub mod processing;
pub mod rating_system;
pub mod side;
