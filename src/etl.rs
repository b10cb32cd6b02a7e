pub mod classify;
pub mod features;
pub mod multipolygon;
pub mod overpass;

use std::future::Future;

use log::{error, info};

use crate::errors::Result;

/// A fetch-then-classify pipeline. `extract` may suspend on the network,
/// `transform` is synchronous.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;

    fn extract(&self) -> impl Future<Output = Result<Self::Input>>;
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    fn process(&self) -> impl Future<Output = Result<Self::Output>> {
        async move {
            info!(etl_name = self.etl_name(); "Starting ETL process");

            info!(etl_name = self.etl_name(); "Extracting");
            let input = match self.extract().await {
                Ok(input) => Ok(input),
                Err(err) => {
                    error!(
                        etl_name = self.etl_name(),
                        err = err.message.as_str();
                        "Extraction failed with error"
                    );
                    Err(err)
                }
            }?;

            info!(etl_name = self.etl_name(); "Transforming");
            let output = match self.transform(input) {
                Ok(output) => Ok(output),
                Err(err) => {
                    error!(
                        etl_name = self.etl_name(),
                        err = err.message.as_str();
                        "Transformation failed with error"
                    );
                    Err(err)
                }
            }?;

            info!(etl_name = self.etl_name(); "Process finished");
            Ok(output)
        }
    }
}
