//! Walkthrough of the broker against the live APIs.
//!
//!     MISTRAL_API_KEY=... cargo run --example usage
//!
//! Set RUST_LOG=airoute=debug to watch routing and fallback decisions.

use airoute::{Broker, BrokerResult, Endpoint, Error, RequestConfig};
use log::error;

fn print_result(label: &str, result: &BrokerResult)
{   println!("{}: {}", label, result.content);
    println!("Provider Used: {}", result.provider);
    if let Some(usage) = result.usage
    {   println!(
          "Tokens: {} in, {} out, {} total",
          usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }
    println!();
}

/// Auto-detection sends chat to Mistral and code to Codestral.
async fn auto_detection(broker: &Broker) -> Result<(), Error>
{   println!("=== Auto-Detection ===");

    let chat = broker.route("Explain recursion in simple terms", None).await?;
    print_result("Chat Result", &chat);

    let code = broker
      .route("Write a TypeScript function to reverse a string", None)
      .await?;
    print_result("Code Result", &code);
    Ok(())
}

async fn explicit_providers(broker: &Broker) -> Result<(), Error>
{   println!("=== Explicit Providers ===");

    let codestral = broker
      .call_codestral(
        "Create a React component that displays a user profile",
        Some(&RequestConfig
        {   temperature: Some(0.3)
          , max_tokens: Some(1024)
          , ..Default::default()
        })
      )
      .await?;
    print_result("Codestral Result", &codestral);

    let mistral = broker
      .call_mistral(
        "Analyze the pros and cons of using TypeScript vs JavaScript for large applications",
        Some(&RequestConfig
        {   temperature: Some(0.5)
          , max_tokens: Some(1500)
          , ..Default::default()
        })
      )
      .await?;
    print_result("Mistral Result", &mistral);
    Ok(())
}

async fn code_completion(broker: &Broker) -> Result<(), Error>
{   println!("=== Code Completion (FIM) ===");

    let completion = broker
      .call_codestral(
        "function calculateFibonacci(n) {\n  if (n <= 1) return n;\n  return calculateFibonacci(n-1) + calculateFibonacci(",
        Some(&RequestConfig
        {   endpoint: Some(Endpoint::Fim)
          , temperature: Some(0.1)
          , max_tokens: Some(512)
          , ..Default::default()
        })
      )
      .await?;
    print_result("Completion Result", &completion);
    Ok(())
}

/// A failing Codestral call is retried on Mistral; only a double
/// failure reaches the caller.
async fn fallback(broker: &Broker)
{   println!("=== Error Handling ===");

    match broker
      .route("Write a complex algorithm for pathfinding", None)
      .await
    {   Ok(result) => print_result("Result with Fallback", &result)
      , Err(e) => eprintln!("Both providers failed: {}", e)
    }
}

async fn configuration(broker: &Broker) -> Result<(), Error>
{   println!("=== Configuration ===");

    let creative = broker
      .route(
        "Write a creative story about AI and humanity",
        Some(&RequestConfig
        {   model: Some("mistral-large-latest".to_string())
          , temperature: Some(0.9)
          , max_tokens: Some(1000)
          , ..Default::default()
        })
      )
      .await?;
    print_result("Creative Result", &creative);

    let precise = broker
      .route(
        "Implement a binary search algorithm in Python with type hints",
        Some(&RequestConfig
        {   model: Some("codestral-latest".to_string())
          , temperature: Some(0.1)
          , max_tokens: Some(800)
          , ..Default::default()
        })
      )
      .await?;
    print_result("Precise Code Result", &precise);
    Ok(())
}

async fn run_examples(broker: &Broker) -> Result<(), Error>
{   auto_detection(broker).await?;
    explicit_providers(broker).await?;
    code_completion(broker).await?;
    fallback(broker).await;
    configuration(broker).await?;
    Ok(())
}

#[tokio::main]
async fn main()
{   env_logger::init();

    let broker = match Broker::from_env()
    {   Ok(broker) => broker
      , Err(e) => {
          error!("Cannot build broker: {}", e);
          std::process::exit(1);
        }
    };

    match run_examples(&broker).await
    {   Ok(()) => println!("All examples completed successfully")
      , Err(e) => {
          eprintln!("Example failed: {}", e);
          std::process::exit(1);
        }
    }
}
