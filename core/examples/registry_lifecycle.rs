use std::sync::Arc;

use opaline_core::{RegistryConfig, RegistryService};
use opaline_oracle::LocalOracle;
use opaline_record::{EncryptedRecord, PartyId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // 1. Stand up an in-process oracle and the registry service
    let oracle = LocalOracle::generate();
    let service = RegistryService::start(RegistryConfig::load()?, Arc::new(oracle.clone()));
    let submitter = PartyId([7; 32]);

    // 2. Open a batch and submit three confidential records.
    //    Binding happens outside the registry; the registry only ever
    //    sees the opaque handles.
    let batch_id = service.open_batch().await?;
    println!("📦 Opened batch {batch_id}");

    for valuation in [100u64, 250, 75] {
        let record = EncryptedRecord::new(
            oracle.bind_value(0xA11CE),
            oracle.bind_value(0xBEEF),
            oracle.bind_value(3),
            oracle.bind_value(1_735_689_600),
            oracle.bind_value(valuation),
        );
        let index = service.append_record(submitter, batch_id, record).await?;
        println!("📝 Appended record {index}");
    }

    // 3. Seal the batch and ask for the aggregate valuation
    service.close_batch(batch_id).await?;
    let request_id = service.request_batch_decryption(batch_id).await?;
    println!("🔐 Batch {batch_id} closed, decryption requested: {request_id}");

    // 4. Play the oracle: pick up the job and reply some time later
    let job = oracle.take_job().expect("job was submitted");
    let reply = oracle.answer(&job)?;
    let total = service
        .submit_decryption_result(request_id, reply.cleartexts, reply.proof)
        .await?;
    println!("✅ Aggregate valuation: {total}");

    // 5. The observation stream records the whole lifecycle
    println!("--- events ---");
    for event in service.events().await? {
        println!("{event:?}");
    }

    service.shutdown().await?;
    Ok(())
}
