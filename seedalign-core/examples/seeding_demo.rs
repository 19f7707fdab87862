//! seedalign demo
//!
//! Runs every seed finder over the same pair of sequences, then aligns the
//! pair with each finder driving the chaining engine.

use seedalign_core::{
    AlignConfig, AlignmentEngine, FinderKind, FinderParams, SearchSpace, SeedFinderFactory,
    Sequence,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("seedalign demo");
    println!("==============\n");

    // Example sequences - similar with some variations
    let query = b"tcagtcgatcgatcgagctagctacgatcgtagcatgcatgcaaacgt";
    let subject = b"tcagtcgatcgaggtcgagctagctacgtagcatgcatgcaaacgt"; // insertion and deletion

    println!("Query:   {}", String::from_utf8_lossy(query));
    println!("Subject: {}\n", String::from_utf8_lossy(subject));

    let space = SearchSpace::whole(query.len(), subject.len());

    for kind in FinderKind::ALL {
        let finder = SeedFinderFactory::create(&FinderParams {
            kind,
            ..Default::default()
        })?;
        let seeds = finder.find(query, subject, &space, 8)?;

        println!("{} ({} seeds of length >= 8)", kind.name(), seeds.len());
        for seed in seeds.iter().take(5) {
            println!("  {}", seed.describe(query));
        }
        if seeds.len() > 5 {
            println!("  ... and {} more seeds", seeds.len() - 5);
        }

        let mut config = AlignConfig::default();
        config.seed.finder = kind;
        let alignment = AlignmentEngine::from_config(&config)?.align(
            Sequence::new("query", query.to_vec()),
            Sequence::new("subject", subject.to_vec()),
        )?;

        print!("{}", alignment);
        println!("identity: {:.3}\n", alignment.identity()?);
    }

    Ok(())
}
