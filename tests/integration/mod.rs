mod descriptor_invariants;
mod publish_pipeline;
mod recovery;
