//! Type compatibility between adjacent plugins in a chain.

use crate::error::CompatibilityError;
use crate::plugin::types::describe;
use crate::plugin::{Plugin, TypeTag};

/// True if some produced type is, or derives from, some accepted type.
/// `wildcard` on either side matches everything.
pub fn is_compatible(generates: &[TypeTag], accepts: &[TypeTag], wildcard: &TypeTag) -> bool {
    if generates.contains(wildcard) || accepts.contains(wildcard) {
        return true;
    }
    generates
        .iter()
        .any(|g| accepts.iter().any(|a| g.is_a(a)))
}

/// Checks every adjacent pair in `plugins`.
///
/// The earlier plugin of each pair must produce output and the later one
/// must accept input. Chains of zero or one plugin are trivially valid.
pub fn check_compatibility<P: Plugin>(plugins: &[P], wildcard: &TypeTag) -> Result<(), CompatibilityError> {
    for (index, pair) in plugins.windows(2).enumerate() {
        let (producer, consumer) = (&pair[0], &pair[1]);

        let Some(output) = producer.as_output_producer() else {
            return Err(CompatibilityError::NotAProducer {
                index,
                name: producer.name().to_string(),
            });
        };
        let Some(input) = consumer.as_input_consumer() else {
            return Err(CompatibilityError::NotAConsumer {
                index: index + 1,
                name: consumer.name().to_string(),
            });
        };

        let generates = output.generates();
        let accepts = input.accepts();
        if !is_compatible(&generates, &accepts, wildcard) {
            return Err(CompatibilityError::Incompatible {
                producer_index: index,
                producer: producer.name().to_string(),
                generates: describe(&generates),
                consumer_index: index + 1,
                consumer: consumer.name().to_string(),
                accepts: describe(&accepts),
            });
        }
    }
    Ok(())
}
