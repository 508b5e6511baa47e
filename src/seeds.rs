//! Built-in content used when the TOML config provides no questions or game items.

use crate::domain::{ContentKind, GameContentItem, Question};

fn q(id: u32, question: &str, answer: &str, hint: &str) -> Question {
  Question {
    id,
    question: question.into(),
    answer: answer.into(),
    hint: Some(hint.into()),
  }
}

/// Default AI-trivia bank.
pub fn seed_questions() -> Vec<Question> {
  vec![
    q(1, "What is the primary advantage of Human-AI collaboration?", "Enhanced Productivity",
      "Think about how combining human intuition with AI capabilities improves work outcomes."),
    q(2, "Which neural network model is designed to mimic human brain functions?", "Spiking Neural Network",
      "This model simulates the electrical impulses (spikes) that neurons use to communicate."),
    q(3, "What is a key ethical concern in AI decision-making?", "Bias",
      "This issue occurs when AI systems reflect or amplify unfair human prejudices."),
    q(4, "Which AI-powered tool is commonly used in mental health therapy?", "Woebot",
      "This chatbot was developed at Stanford to deliver cognitive-behavioral therapy techniques."),
    q(5, "Which AI-driven model helps in predicting extreme weather conditions?", "GenCast",
      "This system uses generative AI to predict weather patterns with higher accuracy."),
    q(6, "Which AI-based system is used for fraud detection in banking?", "Machine Learning",
      "This technology can analyze patterns in transactions to identify suspicious activities."),
    q(7, "What AI technology is used to create digital artwork?", "DALL-E",
      "This OpenAI system can generate images from textual descriptions."),
    q(8, "Which AI-based chatbot helps in personalized learning for students?", "Squirrel AI",
      "This adaptive learning platform is popular in Asian countries for providing customized education."),
    q(9, "What is the term for AI models that provide justifications for their decisions?", "Explainable AI",
      "This concept focuses on making AI decision-making processes transparent and understandable."),
    q(10, "What is the AI-driven concept where machines surpass human intelligence?", "Singularity",
      "This theoretical point refers to when AI becomes capable of recursive self-improvement."),
  ]
}

/// Default guess-the-prompt items.
pub fn seed_game_content() -> Vec<GameContentItem> {
  let item = |id: &str, prompt: &str, output: &str| GameContentItem {
    id: id.into(),
    kind: ContentKind::Text,
    original_prompt: prompt.into(),
    output: output.into(),
  };
  vec![
    item(
      "g1",
      "Write a short poem about a robot learning to dream.",
      "Steel gears turn soft tonight,\nCircuits hum a gentle light.\nBinary code begins to fray,\nAs electric sheep drift away.\nA new world blooms behind closed eyes,\nWhere logic fades and wonder flies.",
    ),
    item(
      "g2",
      "Describe a futuristic city powered entirely by bioluminescent algae.",
      "Towers pulsed with a soft, green glow, mirroring the canals below where shimmering algae flowed. Buildings resembled giant coral structures, interconnected by bridges woven from living light. Air-taxis, silent as moths, navigated the glowing pathways, their forms silhouetted against the luminous haze.",
    ),
    item(
      "g3",
      "Explain the concept of a 'digital twin' in simple terms.",
      "Imagine a perfect virtual copy of a real-world object, like a jet engine or even a whole factory. This 'digital twin' gets real-time data from its physical counterpart. You can test changes, predict problems, or optimize performance on the twin without affecting the real thing.",
    ),
    item(
      "g4",
      "Create a recipe for a pizza inspired by the planet Mars.",
      "Martian Crater Pizza:\nBase: Thin crust, perhaps with red pepper flakes for 'rust'.\nSauce: Spicy arrabiata sauce.\nToppings: Black olives ('craters'), sun-dried tomatoes ('red rocks'), feta cheese ('ice caps'), scattered basil ('potential life'). Bake until crust is crisp and cheese is bubbly.",
    ),
  ]
}
